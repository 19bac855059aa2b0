/*
 * @Description  : 非自回归解码器：热力图只计算一次，随后由解码策略逐步读取热力图构造解。
 *                 每一步的条件分布只取决于上一步所在节点对应的热力图行，
 *                 不再调用网络，因此解码循环的开销与网络规模无关。
 */

use log::{debug, info, trace, warn};
use ndarray::{Array2, Ix2};

use super::{DecoderConfig, EdgeHeatmapGenerator};
use crate::decoding::{DecodeType, DecodingStrategy, StrategyOptions, get_decoding_strategy};
use crate::env::{EnvKind, Environment, get_env};
use crate::errors::DecoderError;
use crate::graph::GraphBatch;
use crate::rollout::RolloutState;
use crate::tensor::Tensor;
use crate::utils::BatchedIndexTable;

/// 解码所用环境的来源
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EnvSource {
    /// 使用解码器配置的环境名
    #[default]
    Default,
    /// 按名称从注册表取得
    Name(String),
    /// 直接使用给定的环境
    Instance(EnvKind),
}

impl From<&str> for EnvSource {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<EnvKind> for EnvSource {
    fn from(env: EnvKind) -> Self {
        Self::Instance(env)
    }
}

/// 一次解码的结果
#[derive(Debug, Clone)]
pub struct DecodeOutput {
    /// 每步所选动作的对数概率 [rollouts, steps]
    pub outputs: Array2<f32>,
    /// 动作序列 [rollouts, steps]
    pub actions: Array2<usize>,
    /// 解码结束后的状态（`calc_reward`时含奖励）
    pub state: RolloutState,
}

#[derive(Debug, Clone)]
pub struct NonAutoregressiveDecoder {
    env_name: String,
    heatmap_generator: EdgeHeatmapGenerator,
    max_decode_steps: Option<usize>,
}

impl NonAutoregressiveDecoder {
    /// 按配置创建，使用默认结构的热力图生成器
    pub fn new(config: DecoderConfig) -> Result<Self, DecoderError> {
        config.validate()?;
        let heatmap_generator = EdgeHeatmapGenerator::new(
            config.embedding_dim,
            config.num_layers,
            config.act_fn,
            config.linear_bias,
            config.undirected_graph,
            config.seed,
        )?;
        Ok(Self {
            env_name: config.env_name,
            heatmap_generator,
            max_decode_steps: config.max_decode_steps,
        })
    }

    /// 使用自定义的热力图生成器
    pub fn with_heatmap_generator(env_name: impl Into<String>, generator: EdgeHeatmapGenerator) -> Self {
        Self {
            env_name: env_name.into(),
            heatmap_generator: generator,
            max_decode_steps: None,
        }
    }

    pub fn with_max_decode_steps(mut self, max_decode_steps: Option<usize>) -> Self {
        self.max_decode_steps = max_decode_steps;
        self
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    pub fn heatmap_generator(&self) -> &EdgeHeatmapGenerator {
        &self.heatmap_generator
    }

    pub fn resolve_env(&self, env: EnvSource) -> Result<EnvKind, DecoderError> {
        match env {
            EnvSource::Default => get_env(&self.env_name),
            EnvSource::Name(name) => get_env(&name),
            EnvSource::Instance(env) => Ok(env),
        }
    }

    /// 解码一批实例
    ///
    /// # 参数
    /// - `state`: 由`env.reset`得到的初始状态，每行一个实例
    /// - `graph`: 与`state`同批次的图，边特征为上游嵌入
    /// - `calc_reward`: 结束后是否把奖励写入`state`
    pub fn forward(
        &self,
        state: RolloutState,
        graph: &GraphBatch,
        env: EnvSource,
        decode_type: DecodeType,
        calc_reward: bool,
        options: StrategyOptions,
    ) -> Result<DecodeOutput, DecoderError> {
        let env = self.resolve_env(env)?;
        let heatmap = self.heatmap_generator.forward(graph)?;

        let mut strategy = get_decoding_strategy(decode_type, &options)?;
        debug!("解码方式：{decode_type}，环境：{}", env.name());
        let (mut state, num_starts) = strategy.pre_decoder_hook(state, &env)?;

        let num_nodes = heatmap.shape()[1];
        let max_steps = self.max_decode_steps.unwrap_or(4 * num_nodes + 16);
        let mut table = BatchedIndexTable::new();
        let mut steps = 0;
        while !state.all_done() {
            if steps >= max_steps {
                return Err(DecoderError::MaxDecodeStepsExceeded(max_steps));
            }
            let (log_p, mask) = Self::get_log_p(&state, &heatmap, num_starts, &mut table)?;
            state = strategy.step(&log_p, &mask, state)?;
            state = env.step(state)?;
            steps += 1;
            trace!(
                "第{steps}步：{}/{}条序列已结束",
                state.done().iter().filter(|&&d| d).count(),
                state.batch_size()
            );
        }

        let (outputs, actions, mut state) = strategy.post_decoder_hook(state, &env)?;
        if calc_reward {
            let reward = env.get_reward(&state, &actions)?;
            state.set_reward(reward);
        }
        info!("解码完成：共{steps}步，返回{}条序列", actions.nrows());
        Ok(DecodeOutput {
            outputs,
            actions,
            state,
        })
    }

    /// 当前一步的条件对数概率与不可选掩码（true为不可选），形状均为[rollouts, num_nodes]。
    ///
    /// - 首步（尚无动作）：取所属实例热力图的行均值
    /// - 其后：取所属实例热力图中上一步节点所在的行
    ///
    /// 不可选位置置为`-inf`后沿节点维做log-softmax；整行均不可选时该行为NaN。
    pub fn get_log_p(
        state: &RolloutState,
        heatmap: &Tensor,
        num_starts: usize,
        table: &mut BatchedIndexTable,
    ) -> Result<(Array2<f32>, Array2<bool>), DecoderError> {
        let shape = heatmap.shape();
        if shape.len() != 3 || shape[1] != shape[2] || shape[1] != state.num_nodes() {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![shape.first().copied().unwrap_or(0), state.num_nodes(), state.num_nodes()],
                got: shape.to_vec(),
                message: "热力图须为[batch_size, num_nodes, num_nodes]".to_string(),
            });
        }
        let (batch_size, num_nodes) = (shape[0], shape[1]);
        let index = table.get(batch_size, num_starts);
        let rollouts = state.batch_size();
        if index.len() != rollouts {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![index.len()],
                got: vec![rollouts],
                message: "推演序列条数须等于batch_size * num_starts".to_string(),
            });
        }

        let mask = state.action_mask().mapv(|feasible| !feasible);
        let mut log_p = match state.action() {
            None => {
                let mean = heatmap.mean_axis(2)?;
                Array2::from_shape_fn((rollouts, num_nodes), |(r, v)| mean[[index[r], v]])
            }
            Some(action) => {
                if let Some(&node) = action.iter().find(|&&a| a >= num_nodes) {
                    return Err(DecoderError::ShapeMismatch {
                        expected: vec![num_nodes],
                        got: vec![node],
                        message: "上一步动作超出节点范围".to_string(),
                    });
                }
                Array2::from_shape_fn((rollouts, num_nodes), |(r, v)| {
                    heatmap[[index[r], action[r], v]]
                })
            }
        };
        log_p.zip_mut_with(&mask, |lp, &masked| {
            if masked {
                *lp = f32::NEG_INFINITY;
            }
        });

        let log_p = Tensor::from_array(log_p.into_dyn())
            .log_softmax_last()?
            .into_array()
            .into_dimensionality::<Ix2>()
            .map_err(|_| DecoderError::ShapeMismatch {
                expected: vec![rollouts, num_nodes],
                got: vec![],
                message: "log_p须为二维".to_string(),
            })?;

        for (r, row) in mask.rows().into_iter().enumerate() {
            if !state.done()[r] && row.iter().all(|&m| m) {
                warn!("第{r}条推演序列尚未结束但已无可选节点，其对数概率为NaN");
            }
        }
        Ok((log_p, mask))
    }
}
