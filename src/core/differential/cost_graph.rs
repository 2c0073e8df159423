//! # 복소 행렬 비용 그래프 (역방향 자동미분 테이프)
//!
//! 연산 노드를 생성 순서대로 테이프에 기록한다. 입력 노드는 항상 소비 노드보다
//! 앞에 있으므로 순전파는 정방향 순회, 역전파는 역방향 순회 한 번으로 끝난다.
//! 미분은 켤레를 취하지 않는 정칙(holomorphic) 규칙을 따르며, 따라서 비용 자체가
//! 복소수다.

use crate::core::error::{Result, TrainingError};
use crate::core::matrix::ComplexMatrixSet;
use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// 테이프 노드 인덱스
pub type NodeId = usize;

/// 테이프에 기록되는 연산
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeOp {
    /// 변수 집합의 `variable`번째 변수
    Leaf { variable: usize },
    /// out[i][j] = Σ_k left[j][k]·right[i][k]  (right · leftᵀ)
    Multiply { left: NodeId, right: NodeId },
    /// out[r] = ½ Σ_c (left[r][c] − right[r][c])²
    Quadratic { left: NodeId, right: NodeId },
    /// 전체 원소 평균 (스칼라)
    Average { input: NodeId },
    /// 원소별 합
    Add { left: NodeId, right: NodeId },
}

#[derive(Debug, Clone)]
struct TapeNode {
    op: TapeOp,
    rows: usize,
    cols: usize,
    /// 순전파 캐시
    value: Vec<Complex64>,
    /// 역전파 누적 그래디언트
    grad: Vec<Complex64>,
}

impl TapeNode {
    fn new(op: TapeOp, rows: usize, cols: usize) -> Self {
        Self {
            op,
            rows,
            cols,
            value: vec![ZERO; rows * cols],
            grad: vec![ZERO; rows * cols],
        }
    }
}

/// 변수 집합 위에 한 번 구성되는 비순환 비용 식
#[derive(Debug, Clone, Default)]
pub struct CostGraph {
    nodes: Vec<TapeNode>,
    output: Option<NodeId>,
}

impl CostGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 세 변수의 삼중 일관성 비용
    ///
    /// `avg(quad(b·c, a)) + avg(quad(a·c, b)) + avg(quad(a·b, c))`
    pub fn trifecta(set: &ComplexMatrixSet, names: [&str; 3]) -> Result<Self> {
        let mut graph = Self::new();
        let a = graph.leaf(set, names[0])?;
        let b = graph.leaf(set, names[1])?;
        let c = graph.leaf(set, names[2])?;

        let e1 = graph.multiply(b, c)?;
        let e2 = graph.multiply(a, c)?;
        let e3 = graph.multiply(a, b)?;

        let q1 = graph.quadratic(e1, a)?;
        let q2 = graph.quadratic(e2, b)?;
        let q3 = graph.quadratic(e3, c)?;

        let m1 = graph.average(q1)?;
        let m2 = graph.average(q2)?;
        let m3 = graph.average(q3)?;

        let partial = graph.add(m1, m2)?;
        let cost = graph.add(partial, m3)?;
        graph.set_output(cost)?;
        Ok(graph)
    }

    pub fn leaf(&mut self, set: &ComplexMatrixSet, name: &str) -> Result<NodeId> {
        let variable = set.index_of(name)?;
        let (rows, cols) = set
            .variable(variable)
            .map(|v| v.shape())
            .ok_or_else(|| TrainingError::NotFound(name.to_string()))?;
        Ok(self.push(TapeOp::Leaf { variable }, rows, cols))
    }

    pub fn multiply(&mut self, left: NodeId, right: NodeId) -> Result<NodeId> {
        let (l_rows, l_cols) = self.shape_of(left)?;
        let (r_rows, r_cols) = self.shape_of(right)?;
        if l_cols != r_cols {
            return Err(TrainingError::Collaborator(format!(
                "Multiply 폭 불일치: {} vs {}",
                l_cols, r_cols
            )));
        }
        Ok(self.push(TapeOp::Multiply { left, right }, r_rows, l_rows))
    }

    pub fn quadratic(&mut self, left: NodeId, right: NodeId) -> Result<NodeId> {
        let left_shape = self.shape_of(left)?;
        let right_shape = self.shape_of(right)?;
        if left_shape != right_shape {
            return Err(TrainingError::Collaborator(format!(
                "Quadratic 형태 불일치: {:?} vs {:?}",
                left_shape, right_shape
            )));
        }
        Ok(self.push(TapeOp::Quadratic { left, right }, left_shape.0, 1))
    }

    pub fn average(&mut self, input: NodeId) -> Result<NodeId> {
        self.shape_of(input)?;
        Ok(self.push(TapeOp::Average { input }, 1, 1))
    }

    pub fn add(&mut self, left: NodeId, right: NodeId) -> Result<NodeId> {
        let left_shape = self.shape_of(left)?;
        let right_shape = self.shape_of(right)?;
        if left_shape != right_shape {
            return Err(TrainingError::Collaborator(format!(
                "Add 형태 불일치: {:?} vs {:?}",
                left_shape, right_shape
            )));
        }
        Ok(self.push(TapeOp::Add { left, right }, left_shape.0, left_shape.1))
    }

    pub fn set_output(&mut self, node: NodeId) -> Result<()> {
        self.shape_of(node)?;
        self.output = Some(node);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn op(&self, node: NodeId) -> Option<TapeOp> {
        self.nodes.get(node).map(|n| n.op)
    }

    /// 마지막 순전파에서 캐시된 노드 값
    pub fn value(&self, node: NodeId) -> Option<&[Complex64]> {
        self.nodes.get(node).map(|n| n.value.as_slice())
    }

    pub fn shape_of(&self, node: NodeId) -> Result<(usize, usize)> {
        self.nodes
            .get(node)
            .map(|n| (n.rows, n.cols))
            .ok_or_else(|| TrainingError::Collaborator(format!("존재하지 않는 노드 {}", node)))
    }

    /// 순전파 + 역전파 한 번
    ///
    /// ∂cost/∂v 를 각 변수의 그래디언트 버퍼에 **더한다** (덮어쓰지 않음).
    /// 호출자는 먼저 `zero_gradients()`를 호출해야 한다. 비용의 첫 성분을 반환.
    pub fn gradient(&mut self, set: &mut ComplexMatrixSet) -> Result<Complex64> {
        let cost = self.forward(set)?;
        self.backward(set)?;
        Ok(cost)
    }

    /// 현재 변수 값으로 순전파만 수행
    pub fn forward(&mut self, set: &ComplexMatrixSet) -> Result<Complex64> {
        let output = self.output_node()?;

        for idx in 0..self.nodes.len() {
            let (done, rest) = self.nodes.split_at_mut(idx);
            let node = &mut rest[0];

            match node.op {
                TapeOp::Leaf { variable } => {
                    let source = set.variable(variable).ok_or_else(|| {
                        TrainingError::Collaborator(format!("잎 변수 {} 없음", variable))
                    })?;
                    if source.len() != node.value.len() {
                        return Err(TrainingError::ShapeMismatch {
                            expected: (node.rows, node.cols),
                            actual: source.shape(),
                        });
                    }
                    node.value.copy_from_slice(source.values());
                }
                TapeOp::Multiply { left, right } => {
                    let (x, y) = (&done[left], &done[right]);
                    let width = x.cols;
                    for i in 0..y.rows {
                        let y_row = &y.value[i * width..(i + 1) * width];
                        for j in 0..x.rows {
                            let x_row = &x.value[j * width..(j + 1) * width];
                            node.value[i * x.rows + j] =
                                x_row.iter().zip(y_row).map(|(a, b)| a * b).sum();
                        }
                    }
                }
                TapeOp::Quadratic { left, right } => {
                    let (x, y) = (&done[left], &done[right]);
                    let width = x.cols;
                    for r in 0..x.rows {
                        let span = r * width..(r + 1) * width;
                        let sum: Complex64 = x.value[span.clone()]
                            .iter()
                            .zip(&y.value[span])
                            .map(|(a, b)| {
                                let p = a - b;
                                p * p
                            })
                            .sum();
                        node.value[r] = 0.5 * sum;
                    }
                }
                TapeOp::Average { input } => {
                    let x = &done[input];
                    let sum: Complex64 = x.value.iter().sum();
                    node.value[0] = sum / x.value.len() as f64;
                }
                TapeOp::Add { left, right } => {
                    let (x, y) = (&done[left], &done[right]);
                    for (out, (a, b)) in node.value.iter_mut().zip(x.value.iter().zip(&y.value)) {
                        *out = a + b;
                    }
                }
            }
        }

        Ok(self.nodes[output].value[0])
    }

    /// 마지막 순전파 캐시를 사용한 역전파
    fn backward(&mut self, set: &mut ComplexMatrixSet) -> Result<()> {
        let output = self.output_node()?;
        for node in &mut self.nodes {
            node.grad.fill(ZERO);
        }
        self.nodes[output].grad[0] = ONE;

        for idx in (0..=output).rev() {
            let (before, rest) = self.nodes.split_at_mut(idx);
            let node = &rest[0];

            match node.op {
                TapeOp::Leaf { variable } => {
                    let target = set.variable_mut(variable).ok_or_else(|| {
                        TrainingError::Collaborator(format!("잎 변수 {} 없음", variable))
                    })?;
                    for (g, d) in target.gradients_mut().iter_mut().zip(&node.grad) {
                        *g += *d;
                    }
                }
                TapeOp::Multiply { left, right } => {
                    let (x, y) = (&before[left], &before[right]);
                    let width = x.cols;
                    let mut dx = vec![ZERO; x.value.len()];
                    let mut dy = vec![ZERO; y.value.len()];
                    for i in 0..y.rows {
                        for j in 0..x.rows {
                            let g = node.grad[i * x.rows + j];
                            for k in 0..width {
                                dx[j * width + k] += y.value[i * width + k] * g;
                                dy[i * width + k] += x.value[j * width + k] * g;
                            }
                        }
                    }
                    accumulate(&mut before[left].grad, &dx);
                    accumulate(&mut before[right].grad, &dy);
                }
                TapeOp::Quadratic { left, right } => {
                    let (x, y) = (&before[left], &before[right]);
                    let width = x.cols;
                    let mut dx = vec![ZERO; x.value.len()];
                    let mut dy = vec![ZERO; y.value.len()];
                    for r in 0..x.rows {
                        let g = node.grad[r];
                        for c in 0..width {
                            let diff = x.value[r * width + c] - y.value[r * width + c];
                            dx[r * width + c] += diff * g;
                            dy[r * width + c] -= diff * g;
                        }
                    }
                    accumulate(&mut before[left].grad, &dx);
                    accumulate(&mut before[right].grad, &dy);
                }
                TapeOp::Average { input } => {
                    let x = &mut before[input];
                    let share = node.grad[0] / x.grad.len() as f64;
                    for g in &mut x.grad {
                        *g += share;
                    }
                }
                TapeOp::Add { left, right } => {
                    let upstream = node.grad.clone();
                    accumulate(&mut before[left].grad, &upstream);
                    accumulate(&mut before[right].grad, &upstream);
                }
            }
        }
        Ok(())
    }

    fn push(&mut self, op: TapeOp, rows: usize, cols: usize) -> NodeId {
        self.nodes.push(TapeNode::new(op, rows, cols));
        self.nodes.len() - 1
    }

    fn output_node(&self) -> Result<NodeId> {
        self.output
            .ok_or_else(|| TrainingError::Collaborator("출력 노드가 지정되지 않았습니다".to_string()))
    }
}

fn accumulate(target: &mut [Complex64], delta: &[Complex64]) {
    for (t, d) in target.iter_mut().zip(delta) {
        *t += *d;
    }
}
