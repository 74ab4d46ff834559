use lightmap_core::{average_color, subdivide, Color, FixtureBox, Frame, PixelFormat, Quad};
use glam::Vec2;
use proptest::prelude::*;

#[test]
fn test_row_of_fixtures_over_gradient() {
    // Four vertical stripes, one per fixture
    let stripes = [
        Color::new(255, 0, 0),
        Color::new(0, 255, 0),
        Color::new(0, 0, 255),
        Color::new(255, 255, 255),
    ];
    let frame = Frame::from_fn(40, 10, PixelFormat::Bgra8, |x, _| stripes[(x / 10) as usize]);
    let fixture_box = FixtureBox::new(20.0, 5.0, 40.0, 10.0);

    for (i, expected) in stripes.iter().enumerate() {
        let quad = subdivide(&fixture_box, i, stripes.len());
        assert_eq!(average_color(&frame, &quad), *expected, "fixture {i}");
    }
}

#[test]
fn test_rotated_box_samples_column() {
    // Top half yellow, bottom half cyan
    let frame = Frame::from_fn(10, 40, PixelFormat::Rgba8, |_, y| {
        if y < 20 {
            Color::new(255, 255, 0)
        } else {
            Color::new(0, 255, 255)
        }
    });
    // A horizontal 40x10 row turned upright
    let fixture_box = FixtureBox::new(5.0, 20.0, 40.0, 10.0).with_rotation(90.0);

    assert_eq!(
        average_color(&frame, &subdivide(&fixture_box, 0, 2)),
        Color::new(255, 255, 0)
    );
    assert_eq!(
        average_color(&frame, &subdivide(&fixture_box, 1, 2)),
        Color::new(0, 255, 255)
    );
}

#[test]
fn test_pixel_on_slice_edge_goes_to_one_fixture() {
    // 2.5 px slices: the centre of pixel 2 sits on the edge between slices 0 and 1
    let frame = Frame::from_fn(10, 1, PixelFormat::Bgra8, |x, _| {
        if x == 2 {
            Color::new(200, 0, 0)
        } else {
            Color::BLACK
        }
    });
    let fixture_box = FixtureBox::new(5.0, 0.5, 10.0, 1.0);

    let colors: Vec<_> = (0..4)
        .map(|i| average_color(&frame, &subdivide(&fixture_box, i, 4)))
        .collect();
    assert_eq!(colors[0], Color::BLACK);
    // Pixels 2, 3 and 4
    assert_eq!(colors[1], Color::new(66, 0, 0));
    assert_eq!(colors[2], Color::BLACK);
    assert_eq!(colors[3], Color::BLACK);
}

fn test_frame() -> Frame {
    Frame::from_fn(32, 32, PixelFormat::Bgra8, |px, py| {
        Color::new((px * 8) as u8, (py * 8) as u8, ((px + py) * 4) as u8)
    })
}

// Mean over every pixel of the frame, without the sampler's bounds clipping
fn brute_force_mean(frame: &Frame, quad: &Quad) -> Option<Color> {
    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            if quad.contains(Vec2::new(x as f32 + 0.5, y as f32 + 0.5)) {
                let px = frame.pixel(x, y).unwrap();
                sum[0] += u64::from(px.r);
                sum[1] += u64::from(px.g);
                sum[2] += u64::from(px.b);
                count += 1;
            }
        }
    }
    (count > 0).then(|| {
        Color::new(
            (sum[0] / count) as u8,
            (sum[1] / count) as u8,
            (sum[2] / count) as u8,
        )
    })
}

proptest! {
    #[test]
    fn prop_slices_partition_box_area(
        width in 1.0f32..500.0,
        height in 1.0f32..500.0,
        rotation in -360.0f32..360.0,
        count in 1usize..32,
    ) {
        let b = FixtureBox::new(0.0, 0.0, width, height).with_rotation(rotation);
        let total: f32 = (0..count).map(|i| subdivide(&b, i, count).area()).sum();
        let expected = width * height;
        prop_assert!((total - expected).abs() <= expected * 1e-3);
    }

    #[test]
    fn prop_sampling_matches_brute_force_mean(
        x in -20.0f32..60.0,
        y in -20.0f32..60.0,
        width in 1.0f32..40.0,
        height in 1.0f32..40.0,
        rotation in 0.0f32..360.0,
    ) {
        let frame = test_frame();
        let quad = subdivide(&FixtureBox { x, y, width, height, rotation }, 0, 1);
        let expected = brute_force_mean(&frame, &quad).unwrap_or_else(|| {
            let c = quad.center();
            let px = c.x.floor().clamp(0.0, 31.0) as u32;
            let py = c.y.floor().clamp(0.0, 31.0) as u32;
            frame.pixel(px, py).unwrap()
        });
        prop_assert_eq!(average_color(&frame, &quad), expected);
    }

    #[test]
    fn prop_point_box_samples_nearest_pixel(x in -20.0f32..60.0, y in -20.0f32..60.0) {
        let frame = test_frame();
        let quad = subdivide(&FixtureBox::new(x, y, 0.0, 0.0), 0, 1);
        prop_assert_eq!(quad.area(), 0.0);
        let c = quad.center();
        let px = c.x.floor().clamp(0.0, 31.0) as u32;
        let py = c.y.floor().clamp(0.0, 31.0) as u32;
        prop_assert_eq!(average_color(&frame, &quad), frame.pixel(px, py).unwrap());
    }
}
