extern crate vqmt;
#[macro_use]
extern crate criterion;

use criterion::Criterion;
use vqmt::video::psnr_hvs::calculate_frame_psnr_hvs;
use vqmt::video::ssim::{calculate_frame_msssim, calculate_frame_ssim};
use vqmt::video::vif::calculate_frame_vifp;
use vqmt::video::{ChromaSampling, FrameInfo, PlaneData};

fn make_frame(height: usize, width: usize, seed: u64) -> FrameInfo<u8> {
    let mut state = seed;
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as u8
    };
    let luma = (0..height * width).map(|_| next()).collect::<Vec<_>>();
    let chroma = (0..(height / 2) * (width / 2))
        .map(|_| next())
        .collect::<Vec<_>>();
    FrameInfo {
        planes: [
            PlaneData {
                width,
                height,
                data: luma,
            },
            PlaneData {
                width: width / 2,
                height: height / 2,
                data: chroma.clone(),
            },
            PlaneData {
                width: width / 2,
                height: height / 2,
                data: chroma,
            },
        ],
        bit_depth: 8,
        chroma_sampling: ChromaSampling::Cs420,
    }
}

pub fn ssim_benchmark(c: &mut Criterion) {
    let frame1 = make_frame(480, 640, 1);
    let frame2 = make_frame(480, 640, 2);
    c.bench_function("SSIM yuv420p8", |b| {
        b.iter(|| {
            calculate_frame_ssim(&frame1, &frame2).unwrap();
        })
    });
}

pub fn msssim_benchmark(c: &mut Criterion) {
    let frame1 = make_frame(480, 640, 1);
    let frame2 = make_frame(480, 640, 2);
    c.bench_function("MSSSIM yuv420p8", |b| {
        b.iter(|| {
            calculate_frame_msssim(&frame1, &frame2).unwrap();
        })
    });
}

pub fn psnrhvs_benchmark(c: &mut Criterion) {
    let frame1 = make_frame(480, 640, 1);
    let frame2 = make_frame(480, 640, 2);
    c.bench_function("PSNR-HVS yuv420p8", |b| {
        b.iter(|| {
            calculate_frame_psnr_hvs(&frame1, &frame2).unwrap();
        })
    });
}

pub fn vifp_benchmark(c: &mut Criterion) {
    let frame1 = make_frame(480, 640, 1);
    let frame2 = make_frame(480, 640, 2);
    c.bench_function("VIFp yuv420p8", |b| {
        b.iter(|| {
            calculate_frame_vifp(&frame1, &frame2).unwrap();
        })
    });
}

criterion_group!(
    benches,
    ssim_benchmark,
    msssim_benchmark,
    psnrhvs_benchmark,
    vifp_benchmark
);
criterion_main!(benches);
