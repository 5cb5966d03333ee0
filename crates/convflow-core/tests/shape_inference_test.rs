mod common;

use common::{assert_relative_close, init_tracing, random_filter, random_tensor, seeded_rng};
use convflow_core::{
    infer_conv2d_shape, infer_depthwise_conv2d_shape, ConvEngine, ConvErrorKind, Dim,
    ExecutionConfig, Padding, PartialShape,
};

type InceptionCase = ([usize; 4], [usize; 4], [usize; 4], usize, Padding);

/// Convolution layers of the Inception (2015) network:
/// (input, filter, output, stride, padding)
const INCEPTION_SHAPES: [InceptionCase; 55] = [
    ([4, 5, 5, 1248], [1, 1, 1248, 128], [4, 5, 5, 128], 1, Padding::Same),
    ([4, 8, 8, 384], [1, 3, 384, 384], [4, 8, 8, 384], 1, Padding::Same),
    ([4, 8, 8, 384], [3, 1, 384, 384], [4, 8, 8, 384], 1, Padding::Same),
    ([4, 8, 8, 2048], [1, 1, 2048, 192], [4, 8, 8, 192], 1, Padding::Same),
    ([4, 8, 8, 448], [3, 3, 448, 384], [4, 8, 8, 384], 1, Padding::Same),
    ([4, 8, 8, 2048], [1, 1, 2048, 320], [4, 8, 8, 320], 1, Padding::Same),
    ([4, 8, 8, 2048], [1, 1, 2048, 448], [4, 8, 8, 448], 1, Padding::Same),
    ([4, 8, 8, 2048], [1, 1, 2048, 384], [4, 8, 8, 384], 1, Padding::Same),
    ([4, 8, 8, 1760], [1, 1, 1760, 384], [4, 8, 8, 384], 1, Padding::Same),
    ([4, 8, 8, 1760], [1, 1, 1760, 192], [4, 8, 8, 192], 1, Padding::Same),
    ([4, 8, 8, 1760], [1, 1, 1760, 448], [4, 8, 8, 448], 1, Padding::Same),
    ([4, 8, 8, 1760], [1, 1, 1760, 320], [4, 8, 8, 320], 1, Padding::Same),
    ([4, 17, 17, 192], [3, 3, 192, 192], [4, 8, 8, 192], 2, Padding::Valid),
    ([4, 17, 17, 192], [3, 3, 192, 192], [4, 17, 17, 192], 1, Padding::Same),
    ([4, 17, 17, 1248], [1, 1, 1248, 192], [4, 17, 17, 192], 1, Padding::Same),
    ([4, 17, 17, 128], [3, 3, 128, 320], [4, 8, 8, 320], 2, Padding::Valid),
    ([4, 17, 17, 1248], [1, 1, 1248, 128], [4, 17, 17, 128], 1, Padding::Same),
    ([4, 17, 17, 224], [1, 3, 224, 224], [4, 17, 17, 224], 1, Padding::Same),
    ([4, 17, 17, 192], [3, 1, 192, 256], [4, 17, 17, 256], 1, Padding::Same),
    ([4, 17, 17, 192], [1, 3, 192, 256], [4, 17, 17, 256], 1, Padding::Same),
    ([4, 17, 17, 1216], [1, 1, 1216, 192], [4, 17, 17, 192], 1, Padding::Same),
    ([4, 17, 17, 1216], [1, 1, 1216, 96], [4, 17, 17, 96], 1, Padding::Same),
    ([4, 17, 17, 224], [3, 1, 224, 224], [4, 17, 17, 224], 1, Padding::Same),
    ([4, 17, 17, 192], [3, 3, 192, 224], [4, 17, 17, 224], 1, Padding::Same),
    ([4, 17, 17, 192], [1, 3, 192, 192], [4, 17, 17, 192], 1, Padding::Same),
    ([4, 17, 17, 1152], [1, 1, 1152, 192], [4, 17, 17, 192], 1, Padding::Same),
    ([4, 17, 17, 1152], [1, 1, 1152, 128], [4, 17, 17, 128], 1, Padding::Same),
    ([4, 17, 17, 192], [3, 1, 192, 192], [4, 17, 17, 192], 1, Padding::Same),
    ([4, 17, 17, 160], [3, 3, 160, 192], [4, 17, 17, 192], 1, Padding::Same),
    ([4, 17, 17, 1152], [1, 1, 1152, 160], [4, 17, 17, 160], 1, Padding::Same),
    ([4, 17, 17, 1024], [1, 1, 1024, 128], [4, 17, 17, 128], 1, Padding::Same),
    ([4, 17, 17, 128], [1, 3, 128, 192], [4, 17, 17, 192], 1, Padding::Same),
    ([4, 17, 17, 1024], [1, 1, 1024, 160], [4, 17, 17, 160], 1, Padding::Same),
    ([4, 17, 17, 128], [3, 1, 128, 192], [4, 17, 17, 192], 1, Padding::Same),
    ([4, 17, 17, 1024], [1, 1, 1024, 256], [4, 17, 17, 256], 1, Padding::Same),
    ([4, 17, 17, 128], [3, 1, 128, 128], [4, 17, 17, 128], 1, Padding::Same),
    ([4, 17, 17, 768], [1, 1, 768, 192], [4, 17, 17, 192], 1, Padding::Same),
    ([4, 17, 17, 128], [1, 3, 128, 128], [4, 17, 17, 128], 1, Padding::Same),
    ([4, 17, 17, 128], [3, 3, 128, 128], [4, 17, 17, 128], 1, Padding::Same),
    ([4, 17, 17, 768], [1, 1, 768, 128], [4, 17, 17, 128], 1, Padding::Same),
    ([4, 17, 17, 768], [1, 1, 768, 320], [4, 17, 17, 320], 1, Padding::Same),
    ([4, 35, 35, 96], [3, 3, 96, 96], [4, 17, 17, 96], 2, Padding::Valid),
    ([4, 35, 35, 288], [3, 3, 288, 384], [4, 17, 17, 384], 2, Padding::Valid),
    ([4, 35, 35, 64], [3, 3, 64, 96], [4, 35, 35, 96], 1, Padding::Same),
    ([4, 35, 35, 288], [1, 1, 288, 64], [4, 35, 35, 64], 1, Padding::Same),
    ([4, 35, 35, 256], [1, 1, 256, 64], [4, 35, 35, 64], 1, Padding::Same),
    ([4, 35, 35, 48], [5, 5, 48, 64], [4, 35, 35, 64], 1, Padding::Same),
    ([4, 35, 35, 256], [1, 1, 256, 48], [4, 35, 35, 48], 1, Padding::Same),
    ([4, 35, 35, 96], [3, 3, 96, 96], [4, 35, 35, 96], 1, Padding::Same),
    ([4, 35, 35, 192], [1, 1, 192, 32], [4, 35, 35, 32], 1, Padding::Same),
    ([4, 35, 35, 192], [1, 1, 192, 64], [4, 35, 35, 64], 1, Padding::Same),
    ([4, 35, 35, 192], [1, 1, 192, 48], [4, 35, 35, 48], 1, Padding::Same),
    ([4, 73, 73, 64], [3, 3, 64, 192], [4, 71, 71, 192], 1, Padding::Valid),
    ([4, 73, 73, 64], [1, 1, 64, 64], [4, 73, 73, 64], 1, Padding::Valid),
    ([4, 147, 147, 24], [1, 1, 24, 64], [4, 147, 147, 64], 1, Padding::Valid),
];

fn known(dims: &[usize]) -> PartialShape {
    PartialShape::from_slice(dims)
}

fn strides(s: usize) -> [usize; 4] {
    [1, s, s, 1]
}

#[test]
fn test_inception_output_shapes() {
    init_tracing();
    for (i, (input, filter, output, stride, padding)) in INCEPTION_SHAPES.iter().enumerate() {
        let inferred = infer_conv2d_shape(&known(input), &known(filter), &strides(*stride), *padding)
            .unwrap_or_else(|e| panic!("case {i}: {e}"));
        assert_eq!(inferred, known(output), "case {i}");
    }
}

#[test]
fn test_inception_backend_parity() {
    // spatial geometry of every layer with batch and depths scaled down
    let reference = ConvEngine::new(ExecutionConfig::reference());
    let parallel = ConvEngine::new(ExecutionConfig::parallel());
    let mut rng = seeded_rng(2015);

    for (input, filter, output, stride, padding) in INCEPTION_SHAPES.iter().step_by(4) {
        let in_depth = input[3].min(6);
        let out_depth = filter[3].min(5);
        let input_shape = [1, input[1], input[2], in_depth];
        let filter_shape = [filter[0], filter[1], in_depth, out_depth];
        let output_shape = [1, output[1], output[2], out_depth];

        let x = random_tensor::<f32>(&mut rng, input_shape);
        let w = random_filter::<f32>(&mut rng, filter_shape);
        let g = random_tensor::<f32>(&mut rng, output_shape);

        let fwd_ref = reference.conv2d(&x, &w, *stride, *stride, *padding).unwrap();
        let fwd_par = parallel.conv2d(&x, &w, *stride, *stride, *padding).unwrap();
        assert_eq!(fwd_ref.shape(), output_shape);
        assert_relative_close(fwd_par.as_slice().unwrap(), fwd_ref.as_slice().unwrap(), 1e-5);

        let dx_ref = reference
            .conv2d_backprop_input(input_shape, &w, &g, *stride, *stride, *padding)
            .unwrap();
        let dx_par = parallel
            .conv2d_backprop_input(input_shape, &w, &g, *stride, *stride, *padding)
            .unwrap();
        assert_relative_close(dx_par.as_slice().unwrap(), dx_ref.as_slice().unwrap(), 1e-5);

        let dw_ref = reference
            .conv2d_backprop_filter(&x, filter_shape, &g, *stride, *stride, *padding)
            .unwrap();
        let dw_par = parallel
            .conv2d_backprop_filter(&x, filter_shape, &g, *stride, *stride, *padding)
            .unwrap();
        assert_relative_close(dw_par.as_slice().unwrap(), dw_ref.as_slice().unwrap(), 1e-5);
    }
}

#[test]
fn test_all_shapes_unknown() {
    let out = infer_conv2d_shape(
        &PartialShape::unknown(),
        &PartialShape::unknown(),
        &strides(1),
        Padding::Same,
    )
    .unwrap();
    assert_eq!(out, PartialShape::unknown_dims(4));
    assert_eq!(out.as_options(), Some(vec![None, None, None, None]));
}

#[test]
fn test_partially_known_shapes() {
    // SAME needs only the input extent
    let input = PartialShape::from(vec![None, Some(9), Some(8), Some(3)]);
    let out = infer_conv2d_shape(&input, &PartialShape::unknown(), &strides(2), Padding::Same).unwrap();
    assert_eq!(out.as_options(), Some(vec![None, Some(5), Some(4), None]));

    // VALID needs the filter extent too
    let out = infer_conv2d_shape(&input, &PartialShape::unknown(), &strides(2), Padding::Valid).unwrap();
    assert_eq!(out.as_options(), Some(vec![None, None, None, None]));

    let filter = PartialShape::from(vec![Some(3), None, Some(3), Some(16)]);
    let out = infer_conv2d_shape(&input, &filter, &strides(2), Padding::Valid).unwrap();
    assert_eq!(out.as_options(), Some(vec![None, Some(4), None, Some(16)]));
    assert_eq!(out[1], Dim::Known(4));
}

#[test]
fn test_incorrect_rank() {
    let err = infer_conv2d_shape(&known(&[1, 3]), &PartialShape::unknown(), &strides(1), Padding::Same)
        .unwrap_err();
    assert_eq!(err.kind(), ConvErrorKind::Rank);

    let err = infer_conv2d_shape(&PartialShape::unknown(), &known(&[1, 3]), &strides(1), Padding::Same)
        .unwrap_err();
    assert_eq!(err.kind(), ConvErrorKind::Rank);
}

#[test]
fn test_depth_mismatch() {
    let err = infer_conv2d_shape(&known(&[32, 20, 20, 3]), &known(&[4, 4, 2, 2]), &strides(1), Padding::Same)
        .unwrap_err();
    assert_eq!(err.kind(), ConvErrorKind::DepthMismatch);
}

#[test]
fn test_illegal_strides() {
    for bad in [[2usize, 1, 1, 1], [1, 1, 1, 2]] {
        let err = infer_conv2d_shape(&PartialShape::unknown(), &PartialShape::unknown(), &bad, Padding::Same)
            .unwrap_err();
        assert_eq!(err.kind(), ConvErrorKind::Stride);
        assert!(err.to_string().contains("strides in the batch and depth"));
    }

    let err = infer_conv2d_shape(
        &PartialShape::unknown(),
        &PartialShape::unknown(),
        &[1, 3, 7, 1],
        Padding::Same,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ConvErrorKind::Stride);
    assert!(err.to_string().contains("equal length strides in the row and column"));
}

#[test]
fn test_filter_larger_than_input() {
    for filter in [[20usize, 21, 3, 2], [21, 20, 3, 2]] {
        let err = infer_conv2d_shape(&known(&[32, 20, 20, 3]), &known(&filter), &strides(1), Padding::Same)
            .unwrap_err();
        assert_eq!(err.kind(), ConvErrorKind::FilterTooLarge);
        assert!(err.to_string().contains("filter must not be larger than the input"));
    }
}

#[test]
fn test_stride_larger_than_filter() {
    for filter in [[4usize, 5, 3, 2], [5, 4, 3, 2]] {
        let err = infer_conv2d_shape(&known(&[32, 20, 20, 3]), &known(&filter), &strides(5), Padding::Same)
            .unwrap_err();
        assert_eq!(err.kind(), ConvErrorKind::StrideTooLarge);
        assert!(err.to_string().contains("stride must be less than or equal to filter"));
    }
}

#[test]
fn test_depthwise_inference_with_unknowns() {
    let out = infer_depthwise_conv2d_shape(
        &PartialShape::unknown(),
        &known(&[3, 3, 4, 2]),
        &strides(1),
        Padding::Same,
    )
    .unwrap();
    assert_eq!(out.as_options(), Some(vec![None, None, None, Some(8)]));
}
