/*
 * @Description  : 图批次。上游嵌入网络输出的节点/边特征以`GraphData`（单图）和
 *                 `GraphBatch`（多图拼接）的形式交给热力图生成器。
 *                 拼接方式同PyG的`Batch`：节点、边特征首维拼接，边索引按节点偏移量平移。
 */

use ndarray::{Array2, Axis, s};

use crate::errors::DecoderError;
use crate::tensor::Tensor;


/// 单个图
#[derive(Debug, Clone, PartialEq)]
pub struct GraphData {
    /// 节点特征 [num_nodes, node_dim]
    x: Tensor,
    /// 边索引 [2, num_edges]，第0行为起点，第1行为终点（均为图内局部编号）
    edge_index: Array2<usize>,
    /// 边特征 [num_edges, edge_dim]
    edge_attr: Tensor,
}

impl GraphData {
    /// 构造单图，仅检查各张量的阶数及边数是否一致；
    /// 边索引是否越界留到生成热力图时检查。
    pub fn new(x: Tensor, edge_index: Array2<usize>, edge_attr: Tensor) -> Result<Self, DecoderError> {
        if x.dimension() != 2 {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![0, 0],
                got: x.shape().to_vec(),
                message: "节点特征须为2维".to_string(),
            });
        }
        if edge_index.nrows() != 2 {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![2, edge_index.ncols()],
                got: edge_index.shape().to_vec(),
                message: "边索引须为[2, num_edges]".to_string(),
            });
        }
        if edge_attr.dimension() != 2 || edge_attr.shape()[0] != edge_index.ncols() {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![edge_index.ncols(), edge_attr.shape().last().copied().unwrap_or(0)],
                got: edge_attr.shape().to_vec(),
                message: "边特征行数须等于边数".to_string(),
            });
        }
        Ok(Self {
            x,
            edge_index,
            edge_attr,
        })
    }

    /// 构造全连接有向图（不含自环），边按`(0,1), (0,2), ..., (n-1,n-2)`的行优先顺序排列，
    /// `edge_attr`须有`n * (n - 1)`行。
    pub fn fully_connected(x: Tensor, edge_attr: Tensor) -> Result<Self, DecoderError> {
        let num_nodes = x.shape().first().copied().unwrap_or(0);
        Self::new(x, fully_connected_edge_index(num_nodes), edge_attr)
    }

    pub fn x(&self) -> &Tensor {
        &self.x
    }

    pub fn edge_index(&self) -> &Array2<usize> {
        &self.edge_index
    }

    pub fn edge_attr(&self) -> &Tensor {
        &self.edge_attr
    }

    pub fn num_nodes(&self) -> usize {
        self.x.shape()[0]
    }

    pub fn num_edges(&self) -> usize {
        self.edge_index.ncols()
    }
}

/// `n`个节点的全连接（无自环）边索引
pub fn fully_connected_edge_index(num_nodes: usize) -> Array2<usize> {
    let pairs = (0..num_nodes)
        .flat_map(|u| (0..num_nodes).filter(move |&v| v != u).map(move |v| (u, v)))
        .collect::<Vec<_>>();
    let mut edge_index = Array2::zeros((2, pairs.len()));
    for (e, (u, v)) in pairs.into_iter().enumerate() {
        edge_index[[0, e]] = u;
        edge_index[[1, e]] = v;
    }
    edge_index
}

/// 多个图拼接成的批次
#[derive(Debug, Clone, PartialEq)]
pub struct GraphBatch {
    /// 所有图的节点特征 [total_nodes, node_dim]
    x: Tensor,
    /// 全局编号的边索引 [2, total_edges]
    edge_index: Array2<usize>,
    /// 所有图的边特征 [total_edges, edge_dim]
    edge_attr: Tensor,
    /// 第i个图的节点位于`node_ptr[i]..node_ptr[i + 1]`
    node_ptr: Vec<usize>,
    /// 第i个图的边位于`edge_ptr[i]..edge_ptr[i + 1]`
    edge_ptr: Vec<usize>,
}

impl GraphBatch {
    pub fn from_data_list(graphs: &[GraphData]) -> Result<Self, DecoderError> {
        if graphs.is_empty() {
            return Err(DecoderError::InvalidConfig("图批次不能为空".to_string()));
        }
        let xs = graphs.iter().map(|g| &g.x).collect::<Vec<_>>();
        let edge_attrs = graphs.iter().map(|g| &g.edge_attr).collect::<Vec<_>>();
        let x = Tensor::concat(&xs)?;
        let edge_attr = Tensor::concat(&edge_attrs)?;

        let mut node_ptr = vec![0];
        let mut edge_ptr = vec![0];
        for g in graphs {
            node_ptr.push(node_ptr[node_ptr.len() - 1] + g.num_nodes());
            edge_ptr.push(edge_ptr[edge_ptr.len() - 1] + g.num_edges());
        }

        let mut edge_index = Array2::zeros((2, edge_ptr[graphs.len()]));
        for (i, g) in graphs.iter().enumerate() {
            let shifted = g.edge_index.mapv(|v| v + node_ptr[i]);
            edge_index
                .slice_mut(s![.., edge_ptr[i]..edge_ptr[i + 1]])
                .assign(&shifted);
        }

        Ok(Self {
            x,
            edge_index,
            edge_attr,
            node_ptr,
            edge_ptr,
        })
    }

    /// 拆回单图列表（边索引恢复为图内局部编号）
    pub fn to_data_list(&self) -> Result<Vec<GraphData>, DecoderError> {
        (0..self.num_graphs()).map(|i| self.get(i)).collect()
    }

    /// 取出第`i`个图
    pub fn get(&self, i: usize) -> Result<GraphData, DecoderError> {
        if i >= self.num_graphs() {
            return Err(DecoderError::InvalidConfig(format!(
                "图编号{i}超出批次大小{}",
                self.num_graphs()
            )));
        }
        let (node_start, node_end) = (self.node_ptr[i], self.node_ptr[i + 1]);
        let (edge_start, edge_end) = (self.edge_ptr[i], self.edge_ptr[i + 1]);
        let edge_index = self
            .edge_index
            .slice(s![.., edge_start..edge_end])
            .mapv(|v| v - node_start);
        Ok(GraphData {
            x: self.x.slice_first(node_start..node_end)?,
            edge_index,
            edge_attr: self.edge_attr.slice_first(edge_start..edge_end)?,
        })
    }

    /// 用新的边特征替换，返回新的批次（原批次不变）
    pub fn with_edge_attr(&self, edge_attr: Tensor) -> Result<Self, DecoderError> {
        if edge_attr.shape().first() != Some(&self.num_edges()) {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![self.num_edges()],
                got: edge_attr.shape().to_vec(),
                message: "替换的边特征行数须等于边数".to_string(),
            });
        }
        Ok(Self {
            edge_attr,
            ..self.clone()
        })
    }

    pub fn x(&self) -> &Tensor {
        &self.x
    }

    pub fn edge_index(&self) -> &Array2<usize> {
        &self.edge_index
    }

    pub fn edge_attr(&self) -> &Tensor {
        &self.edge_attr
    }

    pub fn num_graphs(&self) -> usize {
        self.node_ptr.len() - 1
    }

    pub fn num_edges(&self) -> usize {
        self.edge_index.len_of(Axis(1))
    }

    /// 各图的节点数
    pub fn nodes_per_graph(&self) -> Vec<usize> {
        self.node_ptr.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// 节点偏移量，长度为图数+1
    pub fn node_ptr(&self) -> &[usize] {
        &self.node_ptr
    }

    /// 边偏移量，长度为图数+1
    pub fn edge_ptr(&self) -> &[usize] {
        &self.edge_ptr
    }

    /// 边特征维度
    pub fn edge_dim(&self) -> usize {
        self.edge_attr.shape().get(1).copied().unwrap_or(0)
    }
}
