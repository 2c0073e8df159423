use crate::core::error::TrainingError;
use crate::core::math::determinant::{cofactor, determinant, Scratch, MAX_DIM};
use approx::assert_relative_eq;
use num_complex::Complex64;

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn assert_complex_eq(actual: Complex64, expected: Complex64) {
    let scale = expected.norm().max(1.0);
    assert_relative_eq!(actual.re, expected.re, epsilon = 1e-9 * scale);
    assert_relative_eq!(actual.im, expected.im, epsilon = 1e-9 * scale);
}

#[test]
fn 일차_행렬식_테스트() {
    let m = [c(5.0, -2.0)];
    assert_eq!(determinant(&m, 1).unwrap(), c(5.0, -2.0));

    println!("✅ 1×1 행렬식 테스트 통과");
}

#[test]
fn 이차_행렬식_닫힌형식_테스트() {
    let (a, b, cc, d) = (c(1.0, 2.0), c(-0.5, 1.0), c(3.0, 0.0), c(0.25, -4.0));
    let m = [a, b, cc, d];

    let expected = a * d - b * cc;
    assert_complex_eq(determinant(&m, 2).unwrap(), expected);

    println!("✅ 2×2 행렬식 닫힌형식 테스트 통과");
    println!("   det = {}", expected);
}

#[test]
fn 단위행렬_행렬식_테스트() {
    for n in 1..=MAX_DIM {
        let mut m = vec![c(0.0, 0.0); n * n];
        for i in 0..n {
            m[i * n + i] = c(1.0, 0.0);
        }
        assert_complex_eq(determinant(&m, n).unwrap(), c(1.0, 0.0));
    }

    println!("✅ 단위행렬 행렬식 테스트 통과 (n = 1..={})", MAX_DIM);
}

#[test]
fn 영행_특이행렬_테스트() {
    let m = [
        c(1.0, 1.0), c(2.0, 0.0), c(3.0, -1.0),
        c(0.0, 0.0), c(0.0, 0.0), c(0.0, 0.0),
        c(-2.0, 0.5), c(4.0, 4.0), c(0.1, 0.2),
    ];
    assert_complex_eq(determinant(&m, 3).unwrap(), c(0.0, 0.0));

    println!("✅ 영행 특이행렬 테스트 통과");
}

#[test]
fn 삼차_사루스_규칙_테스트() {
    let m = [
        c(1.0, 0.5), c(-2.0, 1.0), c(0.3, 0.0),
        c(0.0, -1.0), c(2.5, 2.0), c(-1.0, -1.0),
        c(4.0, 0.0), c(0.7, -0.2), c(1.0, 3.0),
    ];
    let e = |r: usize, col: usize| m[r * 3 + col];
    let expected = e(0, 0) * e(1, 1) * e(2, 2)
        + e(0, 1) * e(1, 2) * e(2, 0)
        + e(0, 2) * e(1, 0) * e(2, 1)
        - e(0, 2) * e(1, 1) * e(2, 0)
        - e(0, 0) * e(1, 2) * e(2, 1)
        - e(0, 1) * e(1, 0) * e(2, 2);

    assert_complex_eq(determinant(&m, 3).unwrap(), expected);

    println!("✅ 3×3 사루스 규칙 테스트 통과");
}

#[test]
fn 상삼각_행렬식_대각곱_테스트() {
    let n = 4;
    let diag = [c(2.0, 0.0), c(0.0, 1.0), c(-1.0, 1.0), c(0.5, -0.5)];
    let mut m = vec![c(0.0, 0.0); n * n];
    for i in 0..n {
        for j in i..n {
            m[i * n + j] = if i == j { diag[i] } else { c(j as f64, i as f64 + 1.0) };
        }
    }

    let expected = diag.iter().fold(c(1.0, 0.0), |acc, d| acc * d);
    assert_complex_eq(determinant(&m, n).unwrap(), expected);

    println!("✅ 상삼각 행렬식 대각곱 테스트 통과");
}

#[test]
fn 행_교환_부호_반전_테스트() {
    let m = [
        c(1.0, 0.0), c(2.0, 1.0), c(0.0, 3.0),
        c(-1.0, 2.0), c(0.5, 0.0), c(1.0, 1.0),
        c(2.0, -2.0), c(0.0, 1.0), c(3.0, 0.0),
    ];
    let mut swapped = m;
    swapped.swap(0, 3);
    swapped.swap(1, 4);
    swapped.swap(2, 5);

    let d = determinant(&m, 3).unwrap();
    let d_swapped = determinant(&swapped, 3).unwrap();
    assert_complex_eq(d_swapped, -d);

    println!("✅ 행 교환 부호 반전 테스트 통과");
}

#[test]
fn 여인수_추출_테스트() {
    let zero = c(0.0, 0.0);
    let mut mat: Scratch = [zero; MAX_DIM * MAX_DIM];
    for row in 0..3 {
        for col in 0..3 {
            mat[row * MAX_DIM + col] = c((row * 3 + col) as f64, 0.0);
        }
    }

    let mut temp: Scratch = [zero; MAX_DIM * MAX_DIM];
    cofactor(&mat, &mut temp, 0, 1, 3);

    // 0행 1열 삭제: [[3, 5], [6, 8]]
    assert_eq!(temp[0], c(3.0, 0.0));
    assert_eq!(temp[1], c(5.0, 0.0));
    assert_eq!(temp[MAX_DIM], c(6.0, 0.0));
    assert_eq!(temp[MAX_DIM + 1], c(8.0, 0.0));

    println!("✅ 여인수 추출 테스트 통과");
}

#[test]
fn 잘못된_차원_거부_테스트() {
    let m = vec![c(1.0, 0.0); 4];

    assert!(matches!(determinant(&m, 0), Err(TrainingError::InvalidDimension { n: 0, .. })));
    let big = vec![c(1.0, 0.0); (MAX_DIM + 1) * (MAX_DIM + 1)];
    assert!(matches!(
        determinant(&big, MAX_DIM + 1),
        Err(TrainingError::InvalidDimension { .. })
    ));
    assert!(matches!(determinant(&m, 3), Err(TrainingError::ShapeMismatch { .. })));

    println!("✅ 잘못된 차원 거부 테스트 통과");
}

#[test]
fn 무한대_원소_전파_테스트() {
    let m = [c(f64::INFINITY, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(2.0, 0.0)];
    let d = determinant(&m, 2).unwrap();

    assert!(!d.norm().is_finite());

    println!("✅ 무한대 원소 전파 테스트 통과");
}
