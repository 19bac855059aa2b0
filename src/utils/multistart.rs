/*
 * @Description  : 多起点（multi-start）推演的批次索引：
 *                 把展开后的每条推演序列映射回其所属的原始实例
 */

use std::collections::VecDeque;

/// 缓存表默认容量
pub const DEFAULT_INDEX_TABLE_CAPACITY: usize = 10;

/// 返回长度为`batch_size * num_starts`的索引，第`r`条推演序列属于实例`r / num_starts`。
/// `num_starts <= 1`时即为`[0, batch_size)`。
///
/// ```
/// use nar_decoder::utils::multistart_batched_index;
/// assert_eq!(multistart_batched_index(2, 3), vec![0, 0, 0, 1, 1, 1]);
/// ```
pub fn multistart_batched_index(batch_size: usize, num_starts: usize) -> Vec<usize> {
    if num_starts <= 1 {
        (0..batch_size).collect()
    } else {
        (0..batch_size)
            .flat_map(|i| std::iter::repeat(i).take(num_starts))
            .collect()
    }
}

/// 以`(batch_size, num_starts)`为键的小型查找表，按插入顺序淘汰最旧的项。
/// 由调用方持有（通常只存活于一次解码调用），不存在全局缓存。
#[derive(Debug, Clone)]
pub struct BatchedIndexTable {
    entries: VecDeque<((usize, usize), Vec<usize>)>,
    capacity: usize,
}

impl Default for BatchedIndexTable {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_INDEX_TABLE_CAPACITY)
    }
}

impl BatchedIndexTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `capacity`至少为1
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn get(&mut self, batch_size: usize, num_starts: usize) -> &[usize] {
        let key = (batch_size, num_starts);
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            return &self.entries[pos].1;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries
            .push_back((key, multistart_batched_index(batch_size, num_starts)));
        let last = self.entries.len() - 1;
        &self.entries[last].1
    }

    pub fn contains(&self, batch_size: usize, num_starts: usize) -> bool {
        self.entries
            .iter()
            .any(|(k, _)| *k == (batch_size, num_starts))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
