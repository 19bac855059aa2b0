/*
 * @Description  : 推演状态（rollout state）。解码循环与环境之间传递的可变键值容器：
 *                 固定字段`done`/`action_mask`/`action`/`reward`，
 *                 外加按名存取的张量（问题数据）与索引（如当前节点）。
 *                 每行对应一条推演序列；多起点解码时一个实例会展开成多行。
 */

use std::collections::BTreeMap;

use ndarray::{Array2, Axis};

use crate::errors::DecoderError;
use crate::tensor::Tensor;


/// 常用的键名
pub mod keys {
    /// 城市坐标 [rollouts, num_nodes, 2]
    pub const LOCS: &str = "locs";
    /// 代价矩阵 [rollouts, num_nodes, num_nodes]
    pub const COST_MATRIX: &str = "cost_matrix";
    /// 起点
    pub const FIRST_NODE: &str = "first_node";
    /// 当前所在节点
    pub const CURRENT_NODE: &str = "current_node";
    /// 已走步数
    pub const STEP_COUNT: &str = "step_count";
}

#[derive(Debug, Clone, PartialEq)]
pub struct RolloutState {
    /// 每条序列是否已结束
    done: Vec<bool>,
    /// [rollouts, num_nodes]，true表示该节点当前可选
    action_mask: Array2<bool>,
    /// 上一步选中的节点；首步之前为None
    action: Option<Vec<usize>>,
    /// 解码结束后由环境写入
    reward: Option<Tensor>,
    tensors: BTreeMap<String, Tensor>,
    indices: BTreeMap<String, Vec<usize>>,
}

impl RolloutState {
    /// 以可行性掩码初始化，所有序列均未结束
    pub fn new(action_mask: Array2<bool>) -> Self {
        Self {
            done: vec![false; action_mask.nrows()],
            action_mask,
            action: None,
            reward: None,
            tensors: BTreeMap::new(),
            indices: BTreeMap::new(),
        }
    }

    /// 推演序列条数（展开后的批次大小）
    pub fn batch_size(&self) -> usize {
        self.done.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.action_mask.ncols()
    }

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓固定字段↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    pub fn done(&self) -> &[bool] {
        &self.done
    }

    pub fn all_done(&self) -> bool {
        self.done.iter().all(|&d| d)
    }

    pub fn set_done(&mut self, done: Vec<bool>) -> Result<(), DecoderError> {
        self.check_rows(done.len(), "done")?;
        self.done = done;
        Ok(())
    }

    pub fn action_mask(&self) -> &Array2<bool> {
        &self.action_mask
    }

    pub fn action_mask_mut(&mut self) -> &mut Array2<bool> {
        &mut self.action_mask
    }

    pub fn set_action_mask(&mut self, action_mask: Array2<bool>) -> Result<(), DecoderError> {
        self.check_rows(action_mask.nrows(), "action_mask")?;
        self.action_mask = action_mask;
        Ok(())
    }

    pub fn action(&self) -> Option<&[usize]> {
        self.action.as_deref()
    }

    pub fn set_action(&mut self, action: Vec<usize>) -> Result<(), DecoderError> {
        self.check_rows(action.len(), "action")?;
        self.action = Some(action);
        Ok(())
    }

    pub fn reward(&self) -> Option<&Tensor> {
        self.reward.as_ref()
    }

    pub fn set_reward(&mut self, reward: Tensor) {
        self.reward = Some(reward);
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑固定字段↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓按名存取↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    pub fn get(&self, key: &str) -> Result<&Tensor, DecoderError> {
        self.tensors
            .get(key)
            .ok_or_else(|| DecoderError::MissingStateKey(key.to_string()))
    }

    /// 张量首维须等于序列条数
    pub fn set(&mut self, key: &str, value: Tensor) -> Result<(), DecoderError> {
        self.check_rows(value.shape().first().copied().unwrap_or(0), key)?;
        self.tensors.insert(key.to_string(), value);
        Ok(())
    }

    pub fn get_index(&self, key: &str) -> Result<&[usize], DecoderError> {
        self.indices
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| DecoderError::MissingStateKey(key.to_string()))
    }

    pub fn set_index(&mut self, key: &str, value: Vec<usize>) -> Result<(), DecoderError> {
        self.check_rows(value.len(), key)?;
        self.indices.insert(key.to_string(), value);
        Ok(())
    }

    /// 是否含有该键（固定字段中仅`action`与`reward`可能缺失）
    pub fn contains(&self, key: &str) -> bool {
        match key {
            "done" | "action_mask" => true,
            "action" => self.action.is_some(),
            "reward" => self.reward.is_some(),
            _ => self.tensors.contains_key(key) || self.indices.contains_key(key),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Tensor> {
        self.tensors.remove(key)
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑按名存取↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /// 每条序列复制`num_starts`份，同一实例的副本相邻：
    /// 实例`i`占据第`i * num_starts .. (i + 1) * num_starts`行。
    pub fn batchify(&self, num_starts: usize) -> Result<Self, DecoderError> {
        if num_starts <= 1 {
            return Ok(self.clone());
        }
        let rows = crate::utils::multistart_batched_index(self.batch_size(), num_starts);
        self.select(&rows)
    }

    /// 按行号收集（可重复），返回新的状态
    pub fn select(&self, rows: &[usize]) -> Result<Self, DecoderError> {
        if let Some(&row) = rows.iter().find(|&&r| r >= self.batch_size()) {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![self.batch_size()],
                got: vec![row],
                message: "选取的行号超出序列条数".to_string(),
            });
        }
        let pick = |v: &[usize]| rows.iter().map(|&r| v[r]).collect::<Vec<_>>();
        let tensors = self
            .tensors
            .iter()
            .map(|(k, t)| Ok((k.clone(), t.gather_first(rows)?)))
            .collect::<Result<BTreeMap<_, _>, DecoderError>>()?;
        let reward = match &self.reward {
            Some(r) => Some(r.gather_first(rows)?),
            None => None,
        };
        Ok(Self {
            done: rows.iter().map(|&r| self.done[r]).collect(),
            action_mask: self.action_mask.select(Axis(0), rows),
            action: self.action.as_deref().map(pick),
            reward,
            tensors,
            indices: self
                .indices
                .iter()
                .map(|(k, v)| (k.clone(), pick(v)))
                .collect(),
        })
    }

    fn check_rows(&self, rows: usize, key: &str) -> Result<(), DecoderError> {
        if rows != self.batch_size() {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![self.batch_size()],
                got: vec![rows],
                message: format!("`{key}`的首维须等于序列条数"),
            });
        }
        Ok(())
    }
}
