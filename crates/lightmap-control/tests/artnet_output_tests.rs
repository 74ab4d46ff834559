use std::net::UdpSocket;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lightmap_control::dmx::{compile_senders, encode};
use lightmap_control::{ArtNetConfig, ArtNetConsumer, FixtureType};
use lightmap_core::{Color, Frame, FrameConsumer, PixelFormat, VideoField, VideoFormatDesc};

fn receiver() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(3)))
        .unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

fn format() -> VideoFormatDesc {
    VideoFormatDesc::new("PAL", 720, 576, 25.0)
}

#[test]
fn test_solid_red_end_to_end() {
    let (socket, port) = receiver();
    let config = ArtNetConfig::from_toml_str(&format!(
        r#"
        refresh-rate = 10

        [[senders]]
        host = "127.0.0.1"
        port = {port}
        universe = 0

        [[senders.fixtures]]
        start-address = 1
        fixture-count = 1
        type = "RGB"
        x = 360.0
        y = 288.0
        width = 720.0
        height = 576.0
        "#
    ))
    .unwrap();

    let mut consumer = ArtNetConsumer::new(config).unwrap();
    consumer.initialize(&format(), 1);
    assert!(consumer.is_running());

    let red = Frame::solid(720, 576, PixelFormat::Bgra8, Color::new(255, 0, 0));
    let accepted = futures::executor::block_on(consumer.send(VideoField::Progressive, Arc::new(red)));
    assert!(accepted);

    let mut buf = [0u8; 1024];
    let (len, _) = socket.recv_from(&mut buf).unwrap();
    assert_eq!(len, 530);
    assert_eq!(&buf[0..8], b"Art-Net\0");
    assert_eq!(&buf[14..18], &[0, 0, 2, 0]);
    assert_eq!(&buf[18..21], &[255, 0, 0]);
    assert!(buf[21..530].iter().all(|&b| b == 0));
}

#[test]
fn test_degenerate_box_samples_origin_pixel() {
    // No geometry given: every coordinate defaults to 0
    let (socket, port) = receiver();
    let config = ArtNetConfig::from_toml_str(&format!(
        r#"
        [[senders]]
        host = "127.0.0.1"
        port = {port}
        universe = 258

        [[senders.fixtures]]
        start-address = 5
        fixture-count = 1
        type = "rgbw"
        "#
    ))
    .unwrap();

    let mut consumer = ArtNetConsumer::new(config).unwrap();
    consumer.initialize(&format(), 1);
    let frame = Frame::solid(16, 16, PixelFormat::Rgba8, Color::new(200, 150, 100));
    let _ = consumer.send(VideoField::Progressive, Arc::new(frame));

    let mut buf = [0u8; 1024];
    let (len, _) = socket.recv_from(&mut buf).unwrap();
    assert_eq!(len, 530);
    // Universe 258 = 0x0102, low byte first
    assert_eq!(&buf[14..16], &[0x02, 0x01]);
    assert_eq!(&buf[22..26], &[100, 50, 0, 100]);
}

#[test]
fn test_nothing_sent_without_frame() {
    let (socket, port) = receiver();
    socket
        .set_read_timeout(Some(Duration::from_millis(300)))
        .unwrap();
    let config = ArtNetConfig::from_toml_str(&format!(
        r#"
        refresh-rate = 50
        [[senders]]
        host = "127.0.0.1"
        port = {port}
        "#
    ))
    .unwrap();

    let mut consumer = ArtNetConsumer::new(config).unwrap();
    consumer.initialize(&format(), 1);

    let mut buf = [0u8; 1024];
    assert!(socket.recv_from(&mut buf).is_err());
    assert!(consumer.stats().skipped_ticks > 0);
    assert_eq!(consumer.stats().packets_sent, 0);
}

#[test]
fn test_zero_fixtures_still_sends_full_packet() {
    let (socket, port) = receiver();
    let config = ArtNetConfig::from_toml_str(&format!(
        r#"
        refresh-rate = 20
        [[senders]]
        host = "127.0.0.1"
        port = {port}
        universe = 9
        "#
    ))
    .unwrap();

    let mut consumer = ArtNetConsumer::new(config).unwrap();
    consumer.initialize(&format(), 1);
    let _ = consumer.send(
        VideoField::Progressive,
        Arc::new(Frame::solid(4, 4, PixelFormat::Bgra8, Color::WHITE)),
    );

    let mut buf = [0u8; 1024];
    let (len, _) = socket.recv_from(&mut buf).unwrap();
    assert_eq!(len, 530);
    assert_eq!(buf[14], 9);
    assert!(buf[18..530].iter().all(|&b| b == 0));
}

#[test]
fn test_refresh_rate_zero_rejected() {
    let err = ArtNetConfig::from_toml_str(
        r#"
        refresh-rate = 0
        [[senders]]
        host = "127.0.0.1"
        "#,
    )
    .unwrap_err();
    assert!(err.is_config_error());

    // Programmatic configs are checked on construction as well
    let config = ArtNetConfig {
        refresh_rate: 0,
        senders: vec![],
    };
    let err = ArtNetConsumer::new(config).err().unwrap();
    assert!(err.is_config_error());
}

#[test]
fn test_latest_frame_wins() {
    let config = ArtNetConfig::from_toml_str(
        r#"
        [[senders]]
        host = "127.0.0.1"
        port = 9
        "#,
    )
    .unwrap();
    let consumer = ArtNetConsumer::new(config).unwrap();

    let mut last = None;
    for v in 0..50u8 {
        let frame = Arc::new(Frame::solid(1, 1, PixelFormat::Rgba8, Color::new(v, v, v)));
        let _ = consumer.send(VideoField::Progressive, frame.clone());
        last = Some(frame);
    }
    assert!(Arc::ptr_eq(&consumer.latest_frame().unwrap(), &last.unwrap()));
    assert_eq!(consumer.state()["artnet/frames-delivered"], serde_json::json!(50));
}

#[test]
fn test_compilation_is_idempotent() {
    let config = ArtNetConfig::from_toml_str(
        r#"
        [[senders]]
        host = "10.1.2.3"
        universe = 4

        [[senders.fixtures]]
        start-address = 3
        fixture-count = 12
        type = "RGBW"
        fixture-channels = 6
        x = 100.0
        y = 200.0
        width = 640.0
        height = 32.0
        rotation = 12.5

        [[senders.fixtures]]
        start-address = 100
        fixture-count = 5
        type = "dimmer"
        "#,
    )
    .unwrap();

    let first = compile_senders(&config).unwrap();
    let second = compile_senders(&config).unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].fixtures.len(), 17);
    assert_eq!(first[0].fixtures[0].address, 2);
    assert_eq!(first[0].fixtures[11].address, 2 + 11 * 6);
    assert_eq!(first[0].fixtures[12].address, 99);
}

#[test]
fn test_drop_joins_pacing_thread_promptly() {
    let (_socket, port) = receiver();
    let config = ArtNetConfig::from_toml_str(&format!(
        r#"
        refresh-rate = 1
        [[senders]]
        host = "127.0.0.1"
        port = {port}
        "#
    ))
    .unwrap();
    let mut consumer = ArtNetConsumer::new(config).unwrap();
    consumer.initialize(&format(), 1);
    std::thread::sleep(Duration::from_millis(50));

    let start = Instant::now();
    drop(consumer);
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[test]
fn test_encoder_matches_packet_bytes() {
    for ty in [FixtureType::Dimmer, FixtureType::Rgb, FixtureType::Rgbw] {
        let a = encode(ty, Color::new(12, 200, 77));
        let b = encode(ty, Color::new(12, 200, 77));
        assert_eq!(a, b);
        assert_eq!(a.as_slice().len(), ty.min_channels());
    }
}

#[test]
fn test_bundled_sample_config_compiles() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../lightmap/config/artnet.toml");
    let config = ArtNetConfig::load(&path).unwrap();
    assert_eq!(config.refresh_rate, 30);

    let senders = compile_senders(&config).unwrap();
    assert_eq!(senders.len(), 2);
    assert_eq!(senders[0].fixtures.len(), 16);
    assert_eq!(senders[0].fixtures[8].address, 24);
    assert_eq!(senders[1].universe, 1);
    assert_eq!(senders[1].fixtures.len(), 4);
}
