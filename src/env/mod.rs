/*
 * @Description  : 环境：负责问题的状态转移、可行性掩码与奖励。
 *                 以`enum_dispatch`把闭合的环境集合（`EnvKind`）分派到统一的`Environment`接口，
 *                 名称到环境的映射为静态注册表，不做运行期反射。
 */

mod atsp;
mod tsp;

pub use atsp::AtspEnv;
pub use tsp::TspEnv;

use enum_dispatch::enum_dispatch;
use ndarray::Array2;

use crate::errors::DecoderError;
use crate::rollout::{RolloutState, keys};
use crate::tensor::Tensor;


/// 环境接口
#[enum_dispatch]
pub trait Environment {
    /// 注册名
    fn name(&self) -> &'static str;

    /// 由问题数据构造初始推演状态
    fn reset(&self, instance: &Tensor) -> Result<RolloutState, DecoderError>;

    /// 根据`state.action`前进一步
    fn step(&self, state: RolloutState) -> Result<RolloutState, DecoderError>;

    /// 计算每条推演序列的奖励，形状为`[rollouts]`
    /// * `actions` - [rollouts, steps]，完整的动作序列
    fn get_reward(
        &self,
        state: &RolloutState,
        actions: &Array2<usize>,
    ) -> Result<Tensor, DecoderError>;

    /// 多起点解码时各推演序列的起点：同一实例的第`k`个副本从节点`k % num_nodes`出发
    fn select_start_nodes(&self, state: &RolloutState, num_starts: usize) -> Vec<usize> {
        let num_nodes = state.num_nodes().max(1);
        (0..state.batch_size())
            .map(|r| (r % num_starts.max(1)) % num_nodes)
            .collect()
    }

    /// 随机生成`batch_size`个规模为`num_nodes`的问题实例（固定种子）
    fn generate(&self, batch_size: usize, num_nodes: usize, seed: u64) -> Tensor;
}

#[enum_dispatch(Environment)]
#[derive(Debug, Clone, PartialEq)]
pub enum EnvKind {
    Tsp(TspEnv),
    Atsp(AtspEnv),
}

/// 静态注册表：名称 -> 构造函数
const ENV_REGISTRY: &[(&str, fn() -> EnvKind)] = &[("tsp", build_tsp), ("atsp", build_atsp)];

fn build_tsp() -> EnvKind {
    TspEnv.into()
}

fn build_atsp() -> EnvKind {
    AtspEnv.into()
}

/// 按名称取得环境
pub fn get_env(name: &str) -> Result<EnvKind, DecoderError> {
    ENV_REGISTRY
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, build)| build())
        .ok_or_else(|| DecoderError::UnknownEnvironment(name.to_string()))
}

/// 所有已注册的环境名
pub fn available_envs() -> Vec<&'static str> {
    ENV_REGISTRY.iter().map(|(n, _)| *n).collect()
}

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓路径类问题共用的状态转移↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/

/// 全部节点可选、尚未出发的初始状态
fn initial_tour_state(batch_size: usize, num_nodes: usize) -> Result<RolloutState, DecoderError> {
    let mut state = RolloutState::new(Array2::from_elem((batch_size, num_nodes), true));
    state.set_index(keys::STEP_COUNT, vec![0; batch_size])?;
    Ok(state)
}

/// 访问`action`指定的节点：将其屏蔽、更新当前节点，全部访问完毕即结束。
/// 已结束的序列保持不变。
fn visit_step(mut state: RolloutState) -> Result<RolloutState, DecoderError> {
    let action = state
        .action()
        .ok_or_else(|| DecoderError::MissingStateKey("action".to_string()))?
        .to_vec();
    let num_nodes = state.num_nodes();
    let mut step_count = state.get_index(keys::STEP_COUNT)?.to_vec();
    let mut first_node = match state.get_index(keys::FIRST_NODE) {
        Ok(first) => first.to_vec(),
        Err(_) => action.clone(),
    };
    let mut current_node = match state.get_index(keys::CURRENT_NODE) {
        Ok(current) => current.to_vec(),
        Err(_) => action.clone(),
    };
    let mut done = state.done().to_vec();

    for (r, &node) in action.iter().enumerate() {
        if done[r] {
            continue;
        }
        if node >= num_nodes {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![num_nodes],
                got: vec![node],
                message: format!("第{r}条序列的动作超出节点范围"),
            });
        }
        if step_count[r] == 0 {
            first_node[r] = node;
        }
        current_node[r] = node;
        step_count[r] += 1;
        let mask = state.action_mask_mut();
        mask[[r, node]] = false;
        done[r] = mask.row(r).iter().all(|&feasible| !feasible);
    }

    state.set_index(keys::FIRST_NODE, first_node)?;
    state.set_index(keys::CURRENT_NODE, current_node)?;
    state.set_index(keys::STEP_COUNT, step_count)?;
    state.set_done(done)?;
    Ok(state)
}

/// 每行须恰好是`0..num_nodes`的一个排列
fn check_tour_validity(actions: &Array2<usize>, num_nodes: usize) -> Result<(), DecoderError> {
    for (r, row) in actions.rows().into_iter().enumerate() {
        let mut seen = vec![false; num_nodes];
        for &node in row {
            if node >= num_nodes || seen[node] {
                return Err(DecoderError::InvalidSolution { rollout: r });
            }
            seen[node] = true;
        }
        if seen.iter().any(|&s| !s) {
            return Err(DecoderError::InvalidSolution { rollout: r });
        }
    }
    Ok(())
}

/// 闭合回路的总代价：`cost(a_0, a_1) + ... + cost(a_{n-1}, a_0)`，奖励取其相反数
fn closed_tour_reward<F>(actions: &Array2<usize>, cost: F) -> Tensor
where
    F: Fn(usize, usize, usize) -> f32,
{
    let rewards = actions
        .rows()
        .into_iter()
        .enumerate()
        .map(|(r, row)| {
            let len = row.len();
            let length: f32 = (0..len).map(|i| cost(r, row[i], row[(i + 1) % len])).sum();
            -length
        })
        .collect::<Vec<_>>();
    let rollouts = rewards.len();
    Tensor::new(&rewards, &[rollouts])
}

/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑路径类问题共用的状态转移↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
