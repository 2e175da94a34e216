use std::io::Cursor;
use vqmt::video::psnr_hvs::calculate_frame_psnr_hvs;
use vqmt::video::ssim::{calculate_frame_msssim, calculate_frame_ssim};
use vqmt::video::vif::calculate_frame_vifp;
use vqmt::video::{calculate_frame_metrics, ChromaSampling, FrameInfo, PlaneData, YuvReader};

#[inline(always)]
fn assert_metric_eq(expected: f64, value: f64) {
    assert!(
        (expected - value).abs() < 0.01,
        "Expected {}, got {}",
        expected,
        value
    );
}

fn build_frame<F: Fn(usize, usize) -> u8>(height: usize, width: usize, f: F) -> FrameInfo<u8> {
    let mut luma = Vec::with_capacity(height * width);
    for r in 0..height {
        for c in 0..width {
            luma.push(f(r, c));
        }
    }
    let chroma = PlaneData {
        width: width / 2,
        height: height / 2,
        data: vec![128u8; (width / 2) * (height / 2)],
    };
    FrameInfo {
        planes: [
            PlaneData {
                width,
                height,
                data: luma,
            },
            chroma.clone(),
            chroma,
        ],
        bit_depth: 8,
        chroma_sampling: ChromaSampling::Cs420,
    }
}

/// Textured frame so that windowed statistics are nondegenerate.
fn textured_frame(height: usize, width: usize) -> FrameInfo<u8> {
    build_frame(height, width, |r, c| {
        let v = 96.0
            + 60.0 * (c as f64 * 0.7).sin()
            + 40.0 * (r as f64 * 0.35).cos()
            + (r + c) as f64 * 0.1;
        v.max(0.0).min(255.0) as u8
    })
}

#[test]
fn identical_textured_frames_score_perfect() {
    let frame = textured_frame(192, 192);

    assert_metric_eq(1.0, calculate_frame_ssim(&frame, &frame).unwrap());
    let msssim = calculate_frame_msssim(&frame, &frame).unwrap();
    assert_metric_eq(1.0, msssim.ssim);
    assert_metric_eq(1.0, msssim.msssim);
    assert_metric_eq(1.0, calculate_frame_vifp(&frame, &frame).unwrap());
    let hvs = calculate_frame_psnr_hvs(&frame, &frame).unwrap();
    assert_eq!(100000.0, hvs.psnr_hvs);
    assert_eq!(100000.0, hvs.psnr_hvs_m);
}

#[test]
fn flat_frames_with_constant_offset() {
    let frame1 = build_frame(64, 64, |_, _| 100);
    let frame2 = build_frame(64, 64, |_, _| 102);

    // No AC energy anywhere, so the masking dead-zone never engages and
    // both PSNR-HVS variants agree on a finite dB value.
    let hvs = calculate_frame_psnr_hvs(&frame1, &frame2).unwrap();
    assert!((hvs.psnr_hvs - hvs.psnr_hvs_m).abs() < 1e-9);
    assert!(hvs.psnr_hvs.is_finite());
    assert!(hvs.psnr_hvs < 100000.0);
}

#[test]
fn combined_frame_metrics_match_individual_calls() {
    let frame1 = textured_frame(192, 192);
    let frame2 = build_frame(192, 192, |r, c| {
        frame1.planes[0].data[r * 192 + c].saturating_add(((r * c) % 7) as u8)
    });

    let all = calculate_frame_metrics(&frame1, &frame2).unwrap();
    assert_metric_eq(all.ssim, calculate_frame_ssim(&frame1, &frame2).unwrap());
    assert_metric_eq(
        all.msssim.msssim,
        calculate_frame_msssim(&frame1, &frame2).unwrap().msssim,
    );
    assert_metric_eq(
        all.psnr_hvs.psnr_hvs_m,
        calculate_frame_psnr_hvs(&frame1, &frame2).unwrap().psnr_hvs_m,
    );
    assert_metric_eq(all.vifp, calculate_frame_vifp(&frame1, &frame2).unwrap());
}

#[test]
fn mismatched_resolutions_error_out() {
    let frame1 = textured_frame(64, 64);
    let frame2 = textured_frame(64, 48);
    assert!(calculate_frame_ssim(&frame1, &frame2).is_err());
    assert!(calculate_frame_metrics(&frame1, &frame2).is_err());
}

fn raw_yuv_420(frames: &[FrameInfo<u8>]) -> Vec<u8> {
    let mut data = Vec::new();
    for frame in frames {
        for plane in &frame.planes {
            data.extend_from_slice(&plane.data);
        }
    }
    data
}

#[cfg(feature = "decode")]
#[test]
fn video_scores_average_over_frames() {
    use vqmt::video::ssim::calculate_video_ssim;

    let original = vec![textured_frame(192, 192), textured_frame(192, 192)];
    let processed = vec![
        original[0].clone(),
        build_frame(192, 192, |r, c| {
            original[1].planes[0].data[r * 192 + c].saturating_add(8)
        }),
    ];

    let frame_scores: Vec<f64> = original
        .iter()
        .zip(processed.iter())
        .map(|(a, b)| calculate_frame_ssim(a, b).unwrap())
        .collect();
    let expected = frame_scores.iter().sum::<f64>() / frame_scores.len() as f64;

    let mut dec1 = YuvReader::new(
        Cursor::new(raw_yuv_420(&original)),
        192,
        192,
        ChromaSampling::Cs420,
    )
    .unwrap();
    let mut dec2 = YuvReader::new(
        Cursor::new(raw_yuv_420(&processed)),
        192,
        192,
        ChromaSampling::Cs420,
    )
    .unwrap();
    let result = calculate_video_ssim(&mut dec1, &mut dec2, None).unwrap();
    assert_metric_eq(expected, result);
}

#[cfg(feature = "decode")]
#[test]
fn frame_limit_caps_processing() {
    use vqmt::video::vif::calculate_video_vifp;

    let frame = textured_frame(64, 64);
    let frames = vec![frame.clone(), frame.clone(), frame];
    let mut dec1 = YuvReader::new(
        Cursor::new(raw_yuv_420(&frames)),
        64,
        64,
        ChromaSampling::Cs420,
    )
    .unwrap();
    let mut dec2 = YuvReader::new(
        Cursor::new(raw_yuv_420(&frames)),
        64,
        64,
        ChromaSampling::Cs420,
    )
    .unwrap();
    let result = calculate_video_vifp(&mut dec1, &mut dec2, Some(2)).unwrap();
    assert_metric_eq(1.0, result);
}

#[cfg(feature = "decode")]
#[test]
fn empty_input_is_an_error() {
    use vqmt::video::ssim::calculate_video_ssim;

    let mut dec1 = YuvReader::new(Cursor::new(Vec::<u8>::new()), 64, 64, ChromaSampling::Cs420).unwrap();
    let mut dec2 = YuvReader::new(Cursor::new(Vec::<u8>::new()), 64, 64, ChromaSampling::Cs420).unwrap();
    assert!(calculate_video_ssim(&mut dec1, &mut dec2, None).is_err());
}
