use crate::catalog::ubx::{
    self, CLASS_CFG, CfgCfg, CfgPrt, DEV_BBR, DEV_FLASH, ID_CFG_CFG, ID_CFG_PRT, PROTO_NMEA,
    PROTO_RTCM, PROTO_UBX, UbxFrame,
};

/// Frames captured from a working configuration run.
const REFERENCE_CFG_PRT: [u8; 28] = [
    0xB5, 0x62, 0x06, 0x00, 0x14, 0x00, 0x01, 0x00, 0x00, 0x00, 0xD0, 0x08, 0x00, 0x00, 0x00, 0x96,
    0x00, 0x00, 0x07, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x93, 0x90,
];
const REFERENCE_CFG_CFG: [u8; 21] = [
    0xB5, 0x62, 0x06, 0x09, 0x0D, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x03, 0x1D, 0xAB,
];

#[test]
fn checksum_of_empty_input_is_zero() {
    assert_eq!(ubx::checksum(&[]), [0, 0]);
}

#[test]
fn checksum_accumulates_running_sums_with_wraparound() {
    // a: 1, 3, 6 ; b: 1, 4, 10
    assert_eq!(ubx::checksum(&[1, 2, 3]), [6, 10]);
    // 0xFF + 0x02 wraps to 0x01
    assert_eq!(ubx::checksum(&[0xFF, 0x02]), [0x01, 0x00]);
}

#[test]
fn cfg_prt_uart1_38400_matches_reference_frame() {
    let prt = CfgPrt::uart(1, 38_400, PROTO_UBX | PROTO_NMEA | PROTO_RTCM, PROTO_UBX | PROTO_NMEA);
    let bytes = prt.to_frame().encode();
    assert_eq!(bytes, REFERENCE_CFG_PRT);
    assert_eq!(&bytes[26..], &[0x93, 0x90]);
}

#[test]
fn cfg_cfg_save_to_bbr_and_flash_matches_reference_frame() {
    let cfg = CfgCfg::save(0xFFFF, DEV_BBR | DEV_FLASH);
    let bytes = cfg.to_frame().encode();
    assert_eq!(bytes, REFERENCE_CFG_CFG);
    assert_eq!(&bytes[19..], &[0x1D, 0xAB]);
}

#[test]
fn cfg_cfg_without_device_mask_is_twelve_bytes() {
    let cfg = CfgCfg {
        device_mask: None,
        ..CfgCfg::save(0xFFFF, DEV_BBR)
    };
    let frame = cfg.to_frame();
    assert_eq!(frame.payload.len(), 12);
    assert_eq!(frame.encode()[4..6], [12, 0]);
}

#[test]
fn encode_lays_out_header_length_and_trailing_checksum() {
    let frame = UbxFrame::new(CLASS_CFG, ID_CFG_CFG, vec![0xAA; 300]);
    let bytes = frame.encode();
    assert_eq!(bytes.len(), 6 + 300 + 2);
    assert_eq!(&bytes[..2], &ubx::SYNC);
    assert_eq!(bytes[2], CLASS_CFG);
    assert_eq!(bytes[3], ID_CFG_CFG);
    // little-endian 300
    assert_eq!(&bytes[4..6], &[0x2C, 0x01]);
    let n = bytes.len();
    assert_eq!(ubx::checksum(&bytes[2..n - 2]), [bytes[n - 2], bytes[n - 1]]);
}

#[test]
fn changing_baud_changes_checksum() {
    let a = CfgPrt::uart(1, 38_400, PROTO_UBX, PROTO_UBX).to_frame().encode();
    let b = CfgPrt::uart(1, 115_200, PROTO_UBX, PROTO_UBX).to_frame().encode();
    assert_eq!(a[3], ID_CFG_PRT);
    assert_ne!(a[26..], b[26..]);
    assert_eq!(&b[14..18], &115_200u32.to_le_bytes());
}
