//! Property-based tests for tensor and layer laws
//!
//! Run with: cargo test --test properties

use chargpt::{Init, LayerNorm, MultiHeadAttention, Tensor, Vocabulary};
use proptest::prelude::*;

/// Strategy for a rank-2 tensor with dimensions in `1..=max_dim`
fn matrix(max_dim: usize) -> impl Strategy<Value = Tensor> {
    (1..=max_dim, 1..=max_dim).prop_flat_map(|(r, c)| {
        prop::collection::vec(-10.0f32..10.0, r * c)
            .prop_map(move |data| Tensor::new(data, vec![r, c]).unwrap())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_matmul_shape(m in 1usize..20, k in 1usize..20, n in 1usize..20) {
        let a = Tensor::zeros(&[m, k]).unwrap();
        let b = Tensor::zeros(&[k, n]).unwrap();
        let c = a.matmul(&b).unwrap();
        prop_assert_eq!(c.shape(), &[m, n]);
    }

    #[test]
    fn prop_matmul_inner_mismatch_rejected(m in 1usize..8, k in 1usize..8, n in 1usize..8) {
        let a = Tensor::zeros(&[m, k]).unwrap();
        let b = Tensor::zeros(&[k + 1, n]).unwrap();
        prop_assert!(a.matmul(&b).is_err());
    }

    #[test]
    fn prop_identity_matmul(a in matrix(40)) {
        let identity = |n: usize| {
            let mut eye = Tensor::zeros(&[n, n]).unwrap();
            for i in 0..n {
                eye.set(&[i, i], 1.0).unwrap();
            }
            eye
        };
        let right = a.matmul(&identity(a.shape()[1])).unwrap();
        prop_assert_eq!(right.data(), a.data());
        let left = identity(a.shape()[0]).matmul(&a).unwrap();
        prop_assert_eq!(left.data(), a.data());
    }

    #[test]
    fn prop_softmax_rows_are_distributions(a in matrix(16)) {
        let s = a.softmax(1).unwrap();
        for r in 0..s.shape()[0] {
            let row = s.row(r).unwrap();
            let sum: f32 = row.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-5, "row {} sums to {}", r, sum);
            prop_assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
        }
    }

    #[test]
    fn prop_softmax_first_axis_columns_sum_to_one(a in matrix(12)) {
        let s = a.softmax(0).unwrap();
        let (rows, cols) = (s.shape()[0], s.shape()[1]);
        for c in 0..cols {
            let sum: f32 = (0..rows).map(|r| s.get(&[r, c]).unwrap()).sum();
            prop_assert!((sum - 1.0).abs() < 1e-5, "column {} sums to {}", c, sum);
        }
    }

    #[test]
    fn prop_softmax_rank3_every_axis(
        (shape, data) in (1usize..5, 1usize..5, 1usize..5).prop_flat_map(|(a, b, c)| {
            (Just(vec![a, b, c]), prop::collection::vec(-10.0f32..10.0, a * b * c))
        }),
        dim in 0usize..3,
    ) {
        let t = Tensor::new(data, shape.clone()).unwrap();
        let s = t.softmax(dim).unwrap();
        prop_assert_eq!(s.shape(), t.shape());
        prop_assert!(s.data().iter().all(|&p| (0.0..=1.0).contains(&p)));

        // Sum each slice along `dim`, indexed by the two remaining axes
        let others: Vec<usize> = (0..3).filter(|&d| d != dim).collect();
        for i in 0..shape[others[0]] {
            for j in 0..shape[others[1]] {
                let mut idx = [0usize; 3];
                idx[others[0]] = i;
                idx[others[1]] = j;
                let mut sum = 0.0f32;
                for k in 0..shape[dim] {
                    idx[dim] = k;
                    sum += s.get(&idx).unwrap();
                }
                prop_assert!(
                    (sum - 1.0).abs() < 1e-5,
                    "axis {} slice ({}, {}) sums to {}", dim, i, j, sum
                );
            }
        }
    }

    #[test]
    fn prop_softmax_shift_invariant(a in matrix(8), shift in -50.0f32..50.0) {
        let mut shifted = a.clone();
        shifted.data_mut().iter_mut().for_each(|v| *v += shift);
        let s1 = a.softmax(1).unwrap();
        let s2 = shifted.softmax(1).unwrap();
        for (x, y) in s1.data().iter().zip(s2.data()) {
            prop_assert!((x - y).abs() < 1e-4);
        }
    }

    #[test]
    fn prop_transpose_involution(a in matrix(24)) {
        let t = a.transpose().unwrap();
        prop_assert_eq!(t.shape(), &[a.shape()[1], a.shape()[0]]);
        prop_assert_eq!(t.transpose().unwrap(), a);
    }

    #[test]
    fn prop_concatenate_widths_add(rows in 1usize..6, widths in prop::collection::vec(1usize..6, 1..5)) {
        let parts: Vec<Tensor> = widths
            .iter()
            .map(|&w| Tensor::zeros(&[rows, w]).unwrap())
            .collect();
        let joined = Tensor::concatenate(&parts, 1).unwrap();
        prop_assert_eq!(joined.shape(), &[rows, widths.iter().sum::<usize>()]);
    }

    #[test]
    fn prop_layer_norm_standardizes_rows(a in matrix(16)) {
        let features = a.shape()[1];
        prop_assume!(features > 1);
        // Near-constant rows are dominated by epsilon
        for r in 0..a.shape()[0] {
            let row = a.row(r).unwrap();
            let mean = row.iter().sum::<f32>() / features as f32;
            let var = row.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / features as f32;
            prop_assume!(var > 0.5);
        }

        let ln = LayerNorm::new(features).unwrap();
        let y = ln.forward(&a).unwrap();
        for r in 0..y.shape()[0] {
            let row = y.row(r).unwrap();
            let mean = row.iter().sum::<f32>() / features as f32;
            let var = row.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / features as f32;
            prop_assert!(mean.abs() < 1e-3, "mean {}", mean);
            prop_assert!((var - 1.0).abs() < 1e-2, "var {}", var);
        }
    }

    #[test]
    fn prop_multi_head_shape_independent_of_heads(
        head_size in 1usize..5,
        n_heads in 1usize..5,
        seq in 1usize..6,
        seed in any::<u64>(),
    ) {
        let n_embd = head_size * n_heads;
        let init = Init::Normal { std: 0.1, seed };
        let mha = MultiHeadAttention::new(n_embd, n_heads, 8, false, init).unwrap();
        let x = Tensor::new(
            (0..seq * n_embd).map(|i| (i as f32).cos()).collect(),
            vec![seq, n_embd],
        )
        .unwrap();
        let y = mha.forward(&x).unwrap();
        prop_assert_eq!(y.shape(), &[seq, n_embd]);
        prop_assert!(y.all_finite());
    }

    #[test]
    fn prop_vocab_roundtrip(text in "[a-zA-Z0-9 .,;!?\n]{1,64}") {
        let vocab = Vocabulary::build(&text).unwrap();
        let ids = vocab.encode(&text).unwrap();
        prop_assert!(ids.iter().all(|&id| id < vocab.len()));
        prop_assert_eq!(vocab.decode(&ids).unwrap(), text);
    }
}
