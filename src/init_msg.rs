// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Init message sent by the PMU once it has booted. It tells the host where the command and
//! message queues and the SW managed area live in DMEM.

use core::mem::size_of;

use crate::pmuif::{
    pmu_init_msg_pmu_v1, pmu_init_msg_pmu_v3, pmu_init_msg_pmu_v4, pmu_init_msg_pmu_v5,
};
use crate::{record, Error, QueueId};

/// Placement of a queue in DMEM.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct QueueParams {
    /// Queue register index
    pub index: u32,
    /// DMEM offset of the queue
    pub offset: u32,
    /// Size of the queue in bytes
    pub size: u32,
}

/// Accessors of one init message revision. The PMU writes the message, the host only reads it.
pub trait InitMsgAbi {
    /// Size of the message in bytes.
    fn size(&self) -> usize;

    fn queue_params(&self, buf: &[u8], id: QueueId) -> Result<QueueParams, Error>;

    fn sw_managed_area_offset(&self, buf: &[u8]) -> Result<u16, Error>;

    fn sw_managed_area_size(&self, buf: &[u8]) -> Result<u16, Error>;
}

/// Queues are laid out back to back from `queue_offset`, so the offset of entry `idx` is the
/// sum of the sizes before it.
fn packed_queue_params(
    queue_index: &[u8],
    queue_size: &[u16],
    queue_offset: u16,
    idx: usize,
) -> QueueParams {
    let preceding: u32 = queue_size[..idx].iter().map(|&size| size as u32).sum();

    QueueParams {
        index: queue_index[idx] as u32,
        offset: queue_offset as u32 + preceding,
        size: queue_size[idx] as u32,
    }
}

pub struct InitMsgV1;

impl InitMsgAbi for InitMsgV1 {
    fn size(&self) -> usize {
        size_of::<pmu_init_msg_pmu_v1>()
    }

    fn queue_params(&self, buf: &[u8], id: QueueId) -> Result<QueueParams, Error> {
        let init = record::<pmu_init_msg_pmu_v1>(buf)?;
        let info = init.queue_info[u32::from(id) as usize];

        Ok(QueueParams {
            index: info.index as u32,
            offset: info.offset as u32,
            size: info.size as u32,
        })
    }

    fn sw_managed_area_offset(&self, buf: &[u8]) -> Result<u16, Error> {
        Ok(record::<pmu_init_msg_pmu_v1>(buf)?.sw_managed_area_offset)
    }

    fn sw_managed_area_size(&self, buf: &[u8]) -> Result<u16, Error> {
        Ok(record::<pmu_init_msg_pmu_v1>(buf)?.sw_managed_area_size)
    }
}

pub struct InitMsgV3;

impl InitMsgV3 {
    const HPQ_IDX: usize = 0;
    const LPQ_IDX: usize = 1;
    const MSG_IDX: usize = 2;

    fn queue_idx(id: QueueId) -> usize {
        match id {
            QueueId::Hpq => Self::HPQ_IDX,
            QueueId::Lpq => Self::LPQ_IDX,
            QueueId::Message => Self::MSG_IDX,
        }
    }
}

impl InitMsgAbi for InitMsgV3 {
    fn size(&self) -> usize {
        size_of::<pmu_init_msg_pmu_v3>()
    }

    fn queue_params(&self, buf: &[u8], id: QueueId) -> Result<QueueParams, Error> {
        let init = record::<pmu_init_msg_pmu_v3>(buf)?;
        let queue_size = init.queue_size;

        Ok(packed_queue_params(
            &init.queue_index,
            &queue_size,
            init.queue_offset,
            Self::queue_idx(id),
        ))
    }

    fn sw_managed_area_offset(&self, buf: &[u8]) -> Result<u16, Error> {
        Ok(record::<pmu_init_msg_pmu_v3>(buf)?.sw_managed_area_offset)
    }

    fn sw_managed_area_size(&self, buf: &[u8]) -> Result<u16, Error> {
        Ok(record::<pmu_init_msg_pmu_v3>(buf)?.sw_managed_area_size)
    }
}

/// Same queue mapping as v3, with room for five queues.
pub struct InitMsgV4;

impl InitMsgAbi for InitMsgV4 {
    fn size(&self) -> usize {
        size_of::<pmu_init_msg_pmu_v4>()
    }

    fn queue_params(&self, buf: &[u8], id: QueueId) -> Result<QueueParams, Error> {
        let init = record::<pmu_init_msg_pmu_v4>(buf)?;
        let queue_size = init.queue_size;

        Ok(packed_queue_params(
            &init.queue_index,
            &queue_size,
            init.queue_offset,
            InitMsgV3::queue_idx(id),
        ))
    }

    fn sw_managed_area_offset(&self, buf: &[u8]) -> Result<u16, Error> {
        Ok(record::<pmu_init_msg_pmu_v4>(buf)?.sw_managed_area_offset)
    }

    fn sw_managed_area_size(&self, buf: &[u8]) -> Result<u16, Error> {
        Ok(record::<pmu_init_msg_pmu_v4>(buf)?.sw_managed_area_size)
    }
}

pub struct InitMsgV5;

impl InitMsgV5 {
    const MSG_IDX: usize = 3;

    fn queue_idx(id: QueueId) -> usize {
        match id {
            QueueId::Message => Self::MSG_IDX,
            _ => InitMsgV3::queue_idx(id),
        }
    }
}

impl InitMsgAbi for InitMsgV5 {
    fn size(&self) -> usize {
        size_of::<pmu_init_msg_pmu_v5>()
    }

    fn queue_params(&self, buf: &[u8], id: QueueId) -> Result<QueueParams, Error> {
        let init = record::<pmu_init_msg_pmu_v5>(buf)?;
        let queue_size = init.queue_size;

        Ok(packed_queue_params(
            &init.queue_index,
            &queue_size,
            init.queue_offset,
            Self::queue_idx(id),
        ))
    }

    fn sw_managed_area_offset(&self, buf: &[u8]) -> Result<u16, Error> {
        Ok(record::<pmu_init_msg_pmu_v5>(buf)?.sw_managed_area_offset)
    }

    fn sw_managed_area_size(&self, buf: &[u8]) -> Result<u16, Error> {
        Ok(record::<pmu_init_msg_pmu_v5>(buf)?.sw_managed_area_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_u16(buf: &mut [u8], offset: usize, val: u16) {
        buf[offset..offset + 2].copy_from_slice(&val.to_le_bytes());
    }

    #[test]
    fn message_sizes() {
        assert_eq!(InitMsgV1.size(), 38);
        assert_eq!(InitMsgV3.size(), 36);
        assert_eq!(InitMsgV4.size(), 42);
        assert_eq!(InitMsgV5.size(), 42);
    }

    #[test]
    fn v1_reads_queue_info_by_id() {
        let mut buf = [0u8; 38];
        // queue_info[4] starts at 4 + 4 * 6
        put_u16(&mut buf, 28, 0x80);
        put_u16(&mut buf, 30, 0x1000);
        buf[32] = 4;
        put_u16(&mut buf, 34, 0x2000);
        put_u16(&mut buf, 36, 0x800);

        assert_eq!(
            InitMsgV1.queue_params(&buf, QueueId::Message),
            Ok(QueueParams {
                index: 4,
                offset: 0x1000,
                size: 0x80
            })
        );
        assert_eq!(InitMsgV1.queue_params(&buf, QueueId::Hpq), Ok(QueueParams::default()));
        assert_eq!(InitMsgV1.sw_managed_area_offset(&buf), Ok(0x2000));
        assert_eq!(InitMsgV1.sw_managed_area_size(&buf), Ok(0x800));
    }

    #[test]
    fn v3_queues_are_packed() {
        let mut buf = [0u8; 36];
        buf[1..4].copy_from_slice(&[0, 1, 4]);
        put_u16(&mut buf, 4, 0x100);
        put_u16(&mut buf, 6, 0x80);
        put_u16(&mut buf, 8, 0x40);
        put_u16(&mut buf, 10, 0x1000);
        put_u16(&mut buf, 12, 0x3000);
        put_u16(&mut buf, 14, 0x400);

        let abi = InitMsgV3;
        assert_eq!(
            abi.queue_params(&buf, QueueId::Hpq),
            Ok(QueueParams {
                index: 0,
                offset: 0x1000,
                size: 0x100
            })
        );
        assert_eq!(
            abi.queue_params(&buf, QueueId::Lpq),
            Ok(QueueParams {
                index: 1,
                offset: 0x1100,
                size: 0x80
            })
        );
        assert_eq!(
            abi.queue_params(&buf, QueueId::Message),
            Ok(QueueParams {
                index: 4,
                offset: 0x1180,
                size: 0x40
            })
        );
        assert_eq!(abi.sw_managed_area_offset(&buf), Ok(0x3000));
        assert_eq!(abi.sw_managed_area_size(&buf), Ok(0x400));
    }

    #[test]
    fn v4_message_queue_is_third() {
        let mut buf = [0u8; 42];
        buf[1..6].copy_from_slice(&[0, 1, 2, 3, 4]);
        for (i, size) in [0x10u16, 0x20, 0x30, 0x40, 0x50].into_iter().enumerate() {
            put_u16(&mut buf, 6 + 2 * i, size);
        }
        put_u16(&mut buf, 16, 0x200);

        assert_eq!(
            InitMsgV4.queue_params(&buf, QueueId::Message),
            Ok(QueueParams {
                index: 2,
                offset: 0x230,
                size: 0x30
            })
        );
    }

    #[test]
    fn v5_message_queue_is_fourth() {
        let mut buf = [0u8; 42];
        buf[2..6].copy_from_slice(&[0, 1, 2, 3]);
        for (i, size) in [0x10u16, 0x20, 0x30, 0x40].into_iter().enumerate() {
            put_u16(&mut buf, 6 + 2 * i, size);
        }
        put_u16(&mut buf, 14, 0x200);
        put_u16(&mut buf, 16, 0x5000);
        put_u16(&mut buf, 18, 0x100);

        let abi = InitMsgV5;
        assert_eq!(
            abi.queue_params(&buf, QueueId::Message),
            Ok(QueueParams {
                index: 3,
                offset: 0x260,
                size: 0x40
            })
        );
        assert_eq!(
            abi.queue_params(&buf, QueueId::Lpq),
            Ok(QueueParams {
                index: 1,
                offset: 0x210,
                size: 0x20
            })
        );
        assert_eq!(abi.sw_managed_area_offset(&buf), Ok(0x5000));
        assert_eq!(abi.sw_managed_area_size(&buf), Ok(0x100));
    }

    #[test]
    fn short_message() {
        let buf = [0u8; 41];
        assert_eq!(
            InitMsgV5.queue_params(&buf, QueueId::Hpq),
            Err(Error::InvalidBufferSize)
        );
        assert_eq!(InitMsgV1.sw_managed_area_size(&buf[..37]), Err(Error::InvalidBufferSize));
        assert!(InitMsgV3.sw_managed_area_size(&buf).is_ok());
    }
}
