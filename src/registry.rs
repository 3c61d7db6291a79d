// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from the firmware `app_version` to the record revisions it speaks.

use core::fmt::{self, Debug, Formatter};

use crate::allocation::{AllocationAbi, AllocationV1, AllocationV2, AllocationV3};
use crate::cmdline::{CmdlineArgsAbi, CmdlineArgsV3, CmdlineArgsV4, CmdlineArgsV5, CmdlineArgsV6};
use crate::init_msg::{InitMsgAbi, InitMsgV1, InitMsgV3, InitMsgV4, InitMsgV5};
use crate::perfmon::{PerfmonCmdAbi, PerfmonCmdV1, PerfmonCmdV2, PerfmonCmdV3};
use crate::perfmon::{PerfmonCounterAbi, PerfmonCounterV2};
use crate::pg::{PgEngBufLoadAbi, PgEngBufLoadV0, PgEngBufLoadV1, PgEngBufLoadV2};
use crate::{ChipFamily, Error};

/// Counter sampling GR and CE2 busy time.
pub const PMU_PERFMON_COUNTER_INDEX: u8 = 3;
/// Pstate domain group.
pub const PMU_DOMAIN_GROUP_PSTATE: u8 = 0;
/// PG command updating the ZBC table.
pub const PMU_PG_CMD_ID_ZBC_TABLE_UPDATE: u32 = 16;

/// Revision of every record family in a bundle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AbiVersions {
    pub pg: u8,
    pub perfmon_counter: u8,
    pub cmdline: u8,
    pub allocation: u8,
    pub init_msg: u8,
    pub perfmon_cmd: u8,
}

/// The accessors for one firmware, one per record family.
#[derive(Clone, Copy)]
pub struct AbiBundle {
    family: ChipFamily,
    versions: AbiVersions,
    zbc_save: bool,
    pub pg: &'static dyn PgEngBufLoadAbi,
    pub perfmon_counter: &'static dyn PerfmonCounterAbi,
    pub cmdline: &'static dyn CmdlineArgsAbi,
    pub allocation: &'static dyn AllocationAbi,
    pub init_msg: &'static dyn InitMsgAbi,
    pub perfmon_cmd: &'static dyn PerfmonCmdAbi,
}

impl AbiBundle {
    /// Returns the bundle for the firmware reporting `app_version`.
    pub fn select(app_version: u32) -> Result<Self, Error> {
        Ok(Self::for_family(ChipFamily::try_from(app_version)?))
    }

    pub fn for_family(family: ChipFamily) -> Self {
        match family {
            ChipFamily::Gm20b => Self {
                family,
                versions: AbiVersions {
                    pg: 0,
                    perfmon_counter: 2,
                    cmdline: 3,
                    allocation: 1,
                    init_msg: 1,
                    perfmon_cmd: 1,
                },
                zbc_save: true,
                pg: &PgEngBufLoadV0,
                perfmon_counter: &PerfmonCounterV2,
                cmdline: &CmdlineArgsV3,
                allocation: &AllocationV1,
                init_msg: &InitMsgV1,
                perfmon_cmd: &PerfmonCmdV1,
            },
            ChipFamily::Gp10b => Self {
                family,
                versions: AbiVersions {
                    pg: 1,
                    perfmon_counter: 2,
                    cmdline: 4,
                    allocation: 2,
                    init_msg: 1,
                    perfmon_cmd: 2,
                },
                zbc_save: true,
                pg: &PgEngBufLoadV1,
                perfmon_counter: &PerfmonCounterV2,
                cmdline: &CmdlineArgsV4,
                allocation: &AllocationV2,
                init_msg: &InitMsgV1,
                perfmon_cmd: &PerfmonCmdV2,
            },
            ChipFamily::Gp10x => Self {
                family,
                versions: AbiVersions {
                    pg: 2,
                    perfmon_counter: 2,
                    cmdline: 5,
                    allocation: 3,
                    init_msg: 3,
                    perfmon_cmd: 3,
                },
                zbc_save: true,
                pg: &PgEngBufLoadV2,
                perfmon_counter: &PerfmonCounterV2,
                cmdline: &CmdlineArgsV5,
                allocation: &AllocationV3,
                init_msg: &InitMsgV3,
                perfmon_cmd: &PerfmonCmdV3,
            },
            ChipFamily::Gv11b => Self {
                family,
                versions: AbiVersions {
                    pg: 2,
                    perfmon_counter: 2,
                    cmdline: 6,
                    allocation: 3,
                    init_msg: 4,
                    perfmon_cmd: 3,
                },
                zbc_save: false,
                pg: &PgEngBufLoadV2,
                perfmon_counter: &PerfmonCounterV2,
                cmdline: &CmdlineArgsV6,
                allocation: &AllocationV3,
                init_msg: &InitMsgV4,
                perfmon_cmd: &PerfmonCmdV3,
            },
            ChipFamily::Gv10x | ChipFamily::Tu10x => Self {
                family,
                versions: AbiVersions {
                    pg: 2,
                    perfmon_counter: 2,
                    cmdline: 6,
                    allocation: 3,
                    init_msg: 5,
                    perfmon_cmd: 3,
                },
                zbc_save: false,
                pg: &PgEngBufLoadV2,
                perfmon_counter: &PerfmonCounterV2,
                cmdline: &CmdlineArgsV6,
                allocation: &AllocationV3,
                init_msg: &InitMsgV5,
                perfmon_cmd: &PerfmonCmdV3,
            },
        }
    }

    pub fn family(&self) -> ChipFamily {
        self.family
    }

    pub fn versions(&self) -> AbiVersions {
        self.versions
    }

    /// Whether the firmware saves the ZBC table across power-gating.
    pub fn zbc_save(&self) -> bool {
        self.zbc_save
    }

    pub fn zbc_table_update_cmd_id(&self) -> u32 {
        PMU_PG_CMD_ID_ZBC_TABLE_UPDATE
    }

    pub fn perfmon_counter_index(&self) -> u8 {
        PMU_PERFMON_COUNTER_INDEX
    }

    pub fn perfmon_counter_group_id(&self) -> u8 {
        PMU_DOMAIN_GROUP_PSTATE
    }
}

impl Debug for AbiBundle {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("AbiBundle")
            .field("family", &self.family)
            .field("versions", &self.versions)
            .field("zbc_save", &self.zbc_save)
            .finish()
    }
}

impl PartialEq for AbiBundle {
    fn eq(&self, other: &Self) -> bool {
        self.family == other.family
    }
}

impl Eq for AbiBundle {}
