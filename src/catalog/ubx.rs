//! UBX 二进制帧
//!
//! 帧格式：`B5 62 | class | id | len(LE u16) | payload | CK_A CK_B`。
//! 校验和覆盖 class..payload，在构造时计算，不使用手抄字面量。

/// 帧同步头
pub const SYNC: [u8; 2] = [0xB5, 0x62];
/// 配置类消息
pub const CLASS_CFG: u8 = 0x06;
/// CFG-PRT：端口配置
pub const ID_CFG_PRT: u8 = 0x00;
/// CFG-CFG：清除/保存/加载配置
pub const ID_CFG_CFG: u8 = 0x09;

/// 8N1：8 数据位、无校验、1 停止位（bit4 为兼容保留位）。
pub const MODE_8N1: u32 = 0x0000_08D0;

/// 输入/输出协议掩码位
pub const PROTO_UBX: u16 = 0x0001;
pub const PROTO_NMEA: u16 = 0x0002;
pub const PROTO_RTCM: u16 = 0x0004;

/// CFG-CFG 存储设备掩码位
pub const DEV_BBR: u8 = 0x01;
pub const DEV_FLASH: u8 = 0x02;
pub const DEV_EEPROM: u8 = 0x04;

/// 8 位 Fletcher 校验：CK_A 为逐字节累加和，CK_B 为 CK_A 的累加和（均 mod 256）。
pub fn checksum(bytes: &[u8]) -> [u8; 2] {
    let (a, b) = bytes.iter().fold((0u8, 0u8), |(a, b), &x| {
        let a = a.wrapping_add(x);
        (a, b.wrapping_add(a))
    });
    [a, b]
}

/// 一个 UBX 消息（未编码）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UbxFrame {
    pub class: u8,
    pub id: u8,
    pub payload: Vec<u8>,
}

impl UbxFrame {
    pub fn new(class: u8, id: u8, payload: Vec<u8>) -> Self {
        debug_assert!(payload.len() <= u16::MAX as usize, "UBX payload too long");
        Self { class, id, payload }
    }

    /// 编码为完整的线上字节（含同步头与校验和）
    pub fn encode(&self) -> Vec<u8> {
        let len = self.payload.len() as u16;
        let mut out = Vec::with_capacity(8 + self.payload.len());
        out.extend_from_slice(&SYNC);
        out.push(self.class);
        out.push(self.id);
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&self.payload);
        let ck = checksum(&out[2..]);
        out.extend_from_slice(&ck);
        out
    }
}

/// CFG-PRT（UART）负载，20 字节
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfgPrt {
    pub port_id: u8,
    pub tx_ready: u16,
    pub mode: u32,
    pub baud_rate: u32,
    pub in_proto_mask: u16,
    pub out_proto_mask: u16,
    pub flags: u16,
}

impl CfgPrt {
    /// 8N1 UART 端口配置
    pub fn uart(port_id: u8, baud_rate: u32, in_proto_mask: u16, out_proto_mask: u16) -> Self {
        Self {
            port_id,
            tx_ready: 0,
            mode: MODE_8N1,
            baud_rate,
            in_proto_mask,
            out_proto_mask,
            flags: 0,
        }
    }

    pub fn to_frame(&self) -> UbxFrame {
        let mut p = Vec::with_capacity(20);
        p.push(self.port_id);
        p.push(0); // reserved0
        p.extend_from_slice(&self.tx_ready.to_le_bytes());
        p.extend_from_slice(&self.mode.to_le_bytes());
        p.extend_from_slice(&self.baud_rate.to_le_bytes());
        p.extend_from_slice(&self.in_proto_mask.to_le_bytes());
        p.extend_from_slice(&self.out_proto_mask.to_le_bytes());
        p.extend_from_slice(&self.flags.to_le_bytes());
        p.extend_from_slice(&[0, 0]); // reserved5
        UbxFrame::new(CLASS_CFG, ID_CFG_PRT, p)
    }
}

/// CFG-CFG 负载，带 deviceMask 时 13 字节
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfgCfg {
    pub clear_mask: u32,
    pub save_mask: u32,
    pub load_mask: u32,
    pub device_mask: Option<u8>,
}

impl CfgCfg {
    /// 把 `save_mask` 选中的配置段写入 `device_mask` 指定的存储
    pub fn save(save_mask: u32, device_mask: u8) -> Self {
        Self {
            clear_mask: 0,
            save_mask,
            load_mask: 0,
            device_mask: Some(device_mask),
        }
    }

    pub fn to_frame(&self) -> UbxFrame {
        let mut p = Vec::with_capacity(13);
        p.extend_from_slice(&self.clear_mask.to_le_bytes());
        p.extend_from_slice(&self.save_mask.to_le_bytes());
        p.extend_from_slice(&self.load_mask.to_le_bytes());
        if let Some(dev) = self.device_mask {
            p.push(dev);
        }
        UbxFrame::new(CLASS_CFG, ID_CFG_CFG, p)
    }
}
