/*
 * @Description  : 边热力图生成器：用一个小型MLP把每条边的嵌入映射为(0, 10)内的分数，
 *                 再按边索引散布成每个实例一张[N, N]的热力图。
 *
 * 模型 I/O 与张量层的分工：
 * - save_params/load_params：参数的二进制读写（魔数 + 版本 + bincode张量）
 * - save_model/load_model：超参数 JSON + 参数 bin，可从文件完整重建生成器
 */

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use super::layer::Linear;
use super::{Activation, Module};
use crate::errors::DecoderError;
use crate::graph::GraphBatch;
use crate::tensor::Tensor;

/// 边分数的上界：`sigmoid(.) * HEATMAP_SCALE`
pub const HEATMAP_SCALE: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeHeatmapGenerator {
    /// `num_layers - 1`个`Linear(D, D)`
    linears: Vec<Linear>,
    /// `Linear(D, 1)`
    output: Linear,
    act_fn: Activation,
    embedding_dim: usize,
    linear_bias: bool,
    undirected_graph: bool,
}

/// 生成器的结构描述（不含参数），`save_model`时写成 JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapDescriptor {
    pub embedding_dim: usize,
    pub num_layers: usize,
    pub act_fn: Activation,
    pub linear_bias: bool,
    pub undirected_graph: bool,
    /// 参数文件名（相对 JSON 所在目录）
    #[serde(default)]
    pub params_file: Option<String>,
}

impl EdgeHeatmapGenerator {
    /// 参数文件魔数
    const PARAMS_MAGIC: &'static [u8; 4] = b"NARH";
    /// 参数文件版本
    const PARAMS_VERSION: u32 = 1;

    /// 创建生成器，各层以`seed`为基准依次取不同的种子初始化
    pub fn new(
        embedding_dim: usize,
        num_layers: usize,
        act_fn: Activation,
        linear_bias: bool,
        undirected_graph: bool,
        seed: u64,
    ) -> Result<Self, DecoderError> {
        if num_layers == 0 {
            return Err(DecoderError::InvalidConfig(
                "num_layers须至少为1（输出层）".to_string(),
            ));
        }
        if embedding_dim == 0 {
            return Err(DecoderError::InvalidConfig("embedding_dim须大于0".to_string()));
        }
        let linears = (0..num_layers - 1)
            .map(|i| {
                Linear::new_seeded(embedding_dim, embedding_dim, linear_bias, seed.wrapping_add(i as u64))
            })
            .collect();
        let output = Linear::new_seeded(
            embedding_dim,
            1,
            linear_bias,
            seed.wrapping_add((num_layers - 1) as u64),
        );
        Ok(Self {
            linears,
            output,
            act_fn,
            embedding_dim,
            linear_bias,
            undirected_graph,
        })
    }

    /// 由现成的层组装：隐藏层须为`Linear(D, D)`，输出层须为`Linear(D, 1)`
    pub fn from_layers(
        linears: Vec<Linear>,
        output: Linear,
        act_fn: Activation,
        undirected_graph: bool,
    ) -> Result<Self, DecoderError> {
        let embedding_dim = output.in_features();
        if output.out_features() != 1 {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![embedding_dim, 1],
                got: vec![embedding_dim, output.out_features()],
                message: "输出层须输出1维".to_string(),
            });
        }
        if let Some(layer) = linears
            .iter()
            .find(|l| l.in_features() != embedding_dim || l.out_features() != embedding_dim)
        {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![embedding_dim, embedding_dim],
                got: vec![layer.in_features(), layer.out_features()],
                message: "隐藏层须为方阵".to_string(),
            });
        }
        let linear_bias = output.bias().is_some();
        if linears.iter().any(|l| l.bias().is_some() != linear_bias) {
            return Err(DecoderError::InvalidConfig(
                "各层须一致地使用或不使用偏置".to_string(),
            ));
        }
        Ok(Self {
            linears,
            output,
            act_fn,
            embedding_dim,
            linear_bias,
            undirected_graph,
        })
    }

    /// 由结构描述创建（参数随机初始化，随后通常会加载参数）
    pub fn from_descriptor(descriptor: &HeatmapDescriptor, seed: u64) -> Result<Self, DecoderError> {
        Self::new(
            descriptor.embedding_dim,
            descriptor.num_layers,
            descriptor.act_fn,
            descriptor.linear_bias,
            descriptor.undirected_graph,
            seed,
        )
    }

    pub fn describe(&self) -> HeatmapDescriptor {
        HeatmapDescriptor {
            embedding_dim: self.embedding_dim,
            num_layers: self.num_layers(),
            act_fn: self.act_fn,
            linear_bias: self.linear_bias,
            undirected_graph: self.undirected_graph,
            params_file: None,
        }
    }

    /// 计算热力图 [batch_size, num_nodes, num_nodes]。输入图批次不会被修改。
    pub fn forward(&self, graph: &GraphBatch) -> Result<Tensor, DecoderError> {
        let scores = self.edge_scores(graph)?;
        let heatmap = self.make_heatmaps(graph, &scores)?;
        debug!("热力图已生成，形状为{:?}", heatmap.shape());
        Ok(heatmap)
    }

    /// 每条边的分数 [total_edges]，取值在(0, 10)内
    pub fn edge_scores(&self, graph: &GraphBatch) -> Result<Tensor, DecoderError> {
        let num_edges = graph.num_edges();
        if graph.edge_dim() != self.embedding_dim {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![num_edges, self.embedding_dim],
                got: graph.edge_attr().shape().to_vec(),
                message: "边特征维度须等于embedding_dim".to_string(),
            });
        }
        let mut edge_attr = graph.edge_attr().clone();
        for layer in &self.linears {
            edge_attr = self.act_fn.apply(&layer.forward(&edge_attr)?);
        }
        let scores = self.output.forward(&edge_attr)?.sigmoid() * HEATMAP_SCALE;
        Ok(scores.reshape(&[num_edges])?)
    }

    /// 把边分数散布为热力图；同一位置的重复边以最后一条为准。
    /// 无向图时取`(M + Mᵀ) / 2`。
    pub fn make_heatmaps(&self, graph: &GraphBatch, scores: &Tensor) -> Result<Tensor, DecoderError> {
        if scores.shape() != [graph.num_edges()] {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![graph.num_edges()],
                got: scores.shape().to_vec(),
                message: "边分数个数须等于边数".to_string(),
            });
        }
        let nodes_per_graph = graph.nodes_per_graph();
        let num_nodes = nodes_per_graph[0];
        if let Some((i, &n)) = nodes_per_graph
            .iter()
            .enumerate()
            .find(|&(_, &n)| n != num_nodes)
        {
            return Err(DecoderError::NonUniformNodeCount {
                expected: num_nodes,
                got: n,
                graph: i,
            });
        }

        let (node_ptr, edge_ptr) = (graph.node_ptr(), graph.edge_ptr());
        let edge_index = graph.edge_index();
        let mut heatmaps = Array3::<f32>::zeros((graph.num_graphs(), num_nodes, num_nodes));
        for g in 0..graph.num_graphs() {
            for e in edge_ptr[g]..edge_ptr[g + 1] {
                let src = edge_index[[0, e]] - node_ptr[g];
                let dst = edge_index[[1, e]] - node_ptr[g];
                if let Some(&index) = [src, dst].iter().find(|&&v| v >= num_nodes) {
                    return Err(DecoderError::EdgeIndexOutOfRange {
                        graph: g,
                        index,
                        num_nodes,
                    });
                }
                heatmaps[[g, src, dst]] = scores[[e]];
            }
        }

        let heatmaps = Tensor::from_array(heatmaps.into_dyn());
        if self.undirected_graph {
            Ok((&heatmaps + &heatmaps.transpose_last2()?) * 0.5)
        } else {
            Ok(heatmaps)
        }
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    pub fn num_layers(&self) -> usize {
        self.linears.len() + 1
    }

    pub fn act_fn(&self) -> Activation {
        self.act_fn
    }

    pub fn undirected_graph(&self) -> bool {
        self.undirected_graph
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = Vec::new();
        for layer in self.linears.iter_mut() {
            params.extend(layer.parameters_mut());
        }
        params.extend(self.output.parameters_mut());
        params
    }

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓参数读写↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    /// 按`parameters()`的顺序写出全部参数
    pub fn save_params<W: Write>(&self, writer: &mut W) -> Result<(), DecoderError> {
        let params = self.parameters();
        writer.write_all(Self::PARAMS_MAGIC)?;
        writer.write_all(&Self::PARAMS_VERSION.to_le_bytes())?;
        writer.write_all(&(params.len() as u32).to_le_bytes())?;
        for param in params {
            param.save(writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// 读入`save_params`写出的参数，数量与各自形状须与当前结构一致
    pub fn load_params<R: Read>(&mut self, reader: &mut R) -> Result<(), DecoderError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != Self::PARAMS_MAGIC {
            return Err(DecoderError::Serialization(
                "无效的参数文件：不是热力图生成器的参数文件".to_string(),
            ));
        }
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        let version = u32::from_le_bytes(buf);
        if version != Self::PARAMS_VERSION {
            return Err(DecoderError::Serialization(format!(
                "不支持的参数文件版本：{version}"
            )));
        }
        reader.read_exact(&mut buf)?;
        let count = u32::from_le_bytes(buf) as usize;

        let mut params = self.parameters_mut();
        if count != params.len() {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![params.len()],
                got: vec![count],
                message: "参数个数".to_string(),
            });
        }
        let loaded = (0..count)
            .map(|_| Tensor::load(reader))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some((param, tensor)) = params
            .iter()
            .zip(loaded.iter())
            .find(|(p, t)| !p.is_same_shape(t))
        {
            return Err(DecoderError::ShapeMismatch {
                expected: param.shape().to_vec(),
                got: tensor.shape().to_vec(),
                message: "参数形状".to_string(),
            });
        }
        for (param, tensor) in params.iter_mut().zip(loaded) {
            **param = tensor;
        }
        Ok(())
    }

    /// 保存完整模型，生成两个文件：
    /// - `{path}.json`：结构描述
    /// - `{path}.bin`：参数
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), DecoderError> {
        let path = path.as_ref();
        let bin_path = path.with_extension("bin");
        let mut writer = BufWriter::new(File::create(&bin_path)?);
        self.save_params(&mut writer)?;

        let mut descriptor = self.describe();
        descriptor.params_file = bin_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string());
        std::fs::write(path.with_extension("json"), serde_json::to_string_pretty(&descriptor)?)?;
        Ok(())
    }

    /// 从`save_model`写出的文件重建生成器
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Self, DecoderError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path.with_extension("json"))?;
        let descriptor: HeatmapDescriptor = serde_json::from_str(&json)?;
        let bin_path = match &descriptor.params_file {
            Some(file) => path
                .parent()
                .map_or_else(|| Path::new(file).to_path_buf(), |p| p.join(file)),
            None => path.with_extension("bin"),
        };

        let mut generator = Self::from_descriptor(&descriptor, 0)?;
        let mut reader = BufReader::new(File::open(bin_path)?);
        generator.load_params(&mut reader)?;
        Ok(generator)
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑参数读写↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
}

impl Module for EdgeHeatmapGenerator {
    fn parameters(&self) -> Vec<&Tensor> {
        self.linears
            .iter()
            .flat_map(|layer| layer.parameters())
            .chain(self.output.parameters())
            .collect()
    }
}
