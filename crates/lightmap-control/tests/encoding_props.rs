use lightmap_control::dmx::artnet::{build_dmx_packet, ARTNET_ID, PACKET_LEN};
use lightmap_control::dmx::{encode, FixtureType};
use lightmap_core::Color;
use proptest::prelude::*;

fn fixture_type() -> impl Strategy<Value = FixtureType> {
    prop_oneof![
        Just(FixtureType::Dimmer),
        Just(FixtureType::Rgb),
        Just(FixtureType::Rgbw),
    ]
}

proptest! {
    #[test]
    fn prop_encode_is_deterministic(ty in fixture_type(), r: u8, g: u8, b: u8) {
        let color = Color::new(r, g, b);
        prop_assert_eq!(encode(ty, color), encode(ty, color));
        prop_assert_eq!(encode(ty, color).as_slice().len(), ty.min_channels());
    }

    #[test]
    fn prop_rgbw_white_extraction(r: u8, g: u8, b: u8) {
        let out = encode(FixtureType::Rgbw, Color::new(r, g, b));
        let [r2, g2, b2, w] = <[u8; 4]>::try_from(out.as_slice()).unwrap();
        prop_assert_eq!(w, r.min(g).min(b));
        prop_assert_eq!(u16::from(r2) + u16::from(w), u16::from(r));
        prop_assert_eq!(u16::from(g2) + u16::from(w), u16::from(g));
        prop_assert_eq!(u16::from(b2) + u16::from(w), u16::from(b));
        // At least one color channel is emptied into white
        prop_assert!(r2 == 0 || g2 == 0 || b2 == 0);
    }

    #[test]
    fn prop_dimmer_truncates_weighted_sum(r: u8, g: u8, b: u8) {
        let out = encode(FixtureType::Dimmer, Color::new(r, g, b));
        let exact = 0.279 * f64::from(r) + 0.547 * f64::from(g) + 0.106 * f64::from(b);
        prop_assert_eq!(f64::from(out.as_slice()[0]), exact.floor());
    }

    #[test]
    fn prop_packet_layout(universe in 0u16..=0x7fff, fill: u8) {
        let channels = [fill; 512];
        let packet = build_dmx_packet(universe, &channels).unwrap();
        prop_assert_eq!(packet.len(), PACKET_LEN);
        prop_assert_eq!(&packet[0..8], &ARTNET_ID[..]);
        prop_assert_eq!(&packet[8..14], &[0x00, 0x50, 0x00, 0x0e, 0x00, 0x00][..]);
        prop_assert_eq!(u16::from_le_bytes([packet[14], packet[15]]), universe);
        prop_assert_eq!(&packet[16..18], &[0x02, 0x00][..]);
        prop_assert!(packet[18..].iter().all(|&c| c == fill));
    }
}
