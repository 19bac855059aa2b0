use ndarray::Array2;

/// 逐步记录每条序列所选的动作及其对数概率
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeRecord {
    /// 外层为步，内层为序列
    actions: Vec<Vec<usize>>,
    logprobs: Vec<Vec<f32>>,
}

impl DecodeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, actions: Vec<usize>, logprobs: Vec<f32>) {
        debug_assert_eq!(actions.len(), logprobs.len());
        self.actions.push(actions);
        self.logprobs.push(logprobs);
    }

    pub fn num_steps(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// 按行号重排各步的记录（束搜索回溯父束、多起点择优时使用）
    pub fn reorder(&mut self, rows: &[usize]) {
        for step in self.actions.iter_mut() {
            *step = rows.iter().map(|&r| step[r]).collect();
        }
        for step in self.logprobs.iter_mut() {
            *step = rows.iter().map(|&r| step[r]).collect();
        }
    }

    /// 堆叠为`(logprobs, actions)`，形状均为[rollouts, steps]
    pub fn stack(&self, num_rollouts: usize) -> (Array2<f32>, Array2<usize>) {
        let steps = self.num_steps();
        let logprobs = Array2::from_shape_fn((num_rollouts, steps), |(r, t)| self.logprobs[t][r]);
        let actions = Array2::from_shape_fn((num_rollouts, steps), |(r, t)| self.actions[t][r]);
        (logprobs, actions)
    }
}
