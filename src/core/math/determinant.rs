//! # 복소 행렬식 (수치 건전성 프로브)
//!
//! 첫 행을 따라 라플라스 여인수 전개를 수행한다. 비용은 O(n!)이므로
//! 작은 고정 차원 전용이며, 최적화 목적함수에는 쓰이지 않는다.

use crate::core::error::{Result, TrainingError};
use num_complex::Complex64;

/// 지원하는 최대 행렬 차원 (스크래치 버퍼 크기 결정)
pub const MAX_DIM: usize = 6;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// stride = MAX_DIM 으로 배치된 고정 크기 스크래치 행렬
pub type Scratch = [Complex64; MAX_DIM * MAX_DIM];

/// (p, q) 여인수 행렬을 temp 에 복사
///
/// p 행과 q 열을 제외한 원소를 row-major 순서로 옮긴다. 입력과 출력 모두
/// stride MAX_DIM 을 사용하므로 모든 재귀 단계에서 같은 배치를 공유한다.
pub fn cofactor(mat: &Scratch, temp: &mut Scratch, p: usize, q: usize, n: usize) {
    let (mut i, mut j) = (0, 0);
    for row in 0..n {
        for col in 0..n {
            if row != p && col != q {
                temp[i * MAX_DIM + j] = mat[row * MAX_DIM + col];
                j += 1;
                if j == n - 1 {
                    j = 0;
                    i += 1;
                }
            }
        }
    }
}

/// n×n row-major 복소 행렬의 행렬식
///
/// 호출자는 1 ≤ n ≤ MAX_DIM, matrix.len() == n² 을 보장해야 한다.
pub fn determinant(matrix: &[Complex64], n: usize) -> Result<Complex64> {
    if n == 0 || n > MAX_DIM {
        return Err(TrainingError::InvalidDimension { n, max: MAX_DIM });
    }
    if matrix.len() != n * n {
        return Err(TrainingError::ShapeMismatch {
            expected: (n, n),
            actual: (matrix.len() / n, n),
        });
    }

    let mut mat: Scratch = [ZERO; MAX_DIM * MAX_DIM];
    for row in 0..n {
        mat[row * MAX_DIM..row * MAX_DIM + n].copy_from_slice(&matrix[row * n..(row + 1) * n]);
    }
    Ok(expand(&mat, n))
}

/// 재귀 전개. 깊이마다 스택 위 고정 크기 버퍼 하나만 사용 (힙 할당 없음)
fn expand(mat: &Scratch, n: usize) -> Complex64 {
    if n == 1 {
        return mat[0];
    }

    let mut temp: Scratch = [ZERO; MAX_DIM * MAX_DIM];
    let mut d = ZERO;
    let mut sign = 1.0;
    for f in 0..n {
        cofactor(mat, &mut temp, 0, f, n);
        d += sign * mat[f] * expand(&temp, n - 1);
        sign = -sign;
    }
    d
}
