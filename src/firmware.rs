// SPDX-FileCopyrightText: Copyright The pmu-abi Contributors.
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PMU ucode loading.
//!
//! In open mode a single blob carries the ucode descriptor followed by the ucode image. In
//! secure mode the image, the descriptor and the signature come as three separate blobs.

use log::{debug, error};
use zerocopy::FromBytes;

use crate::pmuif::{pmu_ucode_desc, PMU_UCODE_NB_MAX_DATE_LENGTH, PMU_UCODE_NB_MAX_OVERLAY};
use crate::registry::AbiBundle;
use crate::Error;

/// Non-secure ucode, descriptor followed by the image.
pub const NS_UCODE_BLOB: &str = "gpmu_ucode.bin";
/// Secure ucode image.
pub const UCODE_IMAGE_BLOB: &str = "gpmu_ucode_image.bin";
/// Secure ucode descriptor.
pub const UCODE_DESC_BLOB: &str = "gpmu_ucode_desc.bin";
/// Secure ucode signature.
pub const UCODE_SIG_BLOB: &str = "pmu_sig.bin";

/// Source of firmware blobs.
pub trait FirmwareLoader {
    type Blob: AsRef<[u8]>;

    /// Fetches the blob called `name`, or `None` if it isn't available.
    fn request(&mut self, name: &'static str) -> Option<Self::Blob>;

    /// Gives back a blob obtained from [`FirmwareLoader::request`].
    fn release(&mut self, blob: Self::Blob);
}

/// Overlay load entry of the ucode descriptor.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UcodeOverlay {
    pub start: u32,
    pub size: u32,
}

/// Parsed PMU ucode descriptor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UcodeDesc {
    pub descriptor_size: u32,
    pub image_size: u32,
    pub tools_version: u32,
    pub app_version: u32,
    pub date: [u8; PMU_UCODE_NB_MAX_DATE_LENGTH],
    pub bootloader_start_offset: u32,
    pub bootloader_size: u32,
    pub bootloader_imem_offset: u32,
    pub bootloader_entry_point: u32,
    pub app_start_offset: u32,
    pub app_size: u32,
    pub app_imem_offset: u32,
    pub app_imem_entry: u32,
    pub app_dmem_offset: u32,
    pub app_resident_code_offset: u32,
    pub app_resident_code_size: u32,
    pub app_resident_data_offset: u32,
    pub app_resident_data_size: u32,
    pub nb_overlays: u32,
    pub load_ovl: [UcodeOverlay; PMU_UCODE_NB_MAX_OVERLAY],
    pub compressed: u32,
}

impl UcodeDesc {
    /// Size of the descriptor in bytes.
    pub const SIZE: usize = size_of::<pmu_ucode_desc>();

    /// Parses the descriptor at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let Ok((raw, _)) = pmu_ucode_desc::ref_from_prefix(bytes) else {
            return Err(Error::MalformedDescriptor);
        };

        let mut load_ovl = [UcodeOverlay::default(); PMU_UCODE_NB_MAX_OVERLAY];
        let raw_ovl = raw.load_ovl;
        for (ovl, [start, size]) in load_ovl.iter_mut().zip(raw_ovl) {
            *ovl = UcodeOverlay { start, size };
        }

        Ok(Self {
            descriptor_size: raw.descriptor_size,
            image_size: raw.image_size,
            tools_version: raw.tools_version,
            app_version: raw.app_version,
            date: raw.date,
            bootloader_start_offset: raw.bootloader_start_offset,
            bootloader_size: raw.bootloader_size,
            bootloader_imem_offset: raw.bootloader_imem_offset,
            bootloader_entry_point: raw.bootloader_entry_point,
            app_start_offset: raw.app_start_offset,
            app_size: raw.app_size,
            app_imem_offset: raw.app_imem_offset,
            app_imem_entry: raw.app_imem_entry,
            app_dmem_offset: raw.app_dmem_offset,
            app_resident_code_offset: raw.app_resident_code_offset,
            app_resident_code_size: raw.app_resident_code_size,
            app_resident_data_offset: raw.app_resident_data_offset,
            app_resident_data_size: raw.app_resident_data_size,
            nb_overlays: raw.nb_overlays,
            load_ovl,
            compressed: raw.compressed,
        })
    }

    /// Build date, up to the first NUL.
    pub fn date_str(&self) -> Option<&str> {
        let len = self.date.iter().position(|&b| b == 0).unwrap_or(self.date.len());
        core::str::from_utf8(&self.date[..len]).ok()
    }

    /// Valid overlay entries.
    pub fn overlays(&self) -> &[UcodeOverlay] {
        let count = (self.nb_overlays as usize).min(PMU_UCODE_NB_MAX_OVERLAY);
        &self.load_ovl[..count]
    }
}

/// Blobs backing a loaded firmware.
#[derive(Debug)]
pub enum FirmwareBlobs<B> {
    Open { ucode: B },
    Secure { image: B, desc: B, sig: B },
}

/// A loaded PMU firmware with its selected ABI.
#[derive(Debug)]
pub struct LoadedFirmware<B> {
    blobs: FirmwareBlobs<B>,
    desc: UcodeDesc,
    bundle: AbiBundle,
}

impl<B: AsRef<[u8]>> LoadedFirmware<B> {
    pub fn desc(&self) -> &UcodeDesc {
        &self.desc
    }

    pub fn bundle(&self) -> AbiBundle {
        self.bundle
    }

    pub fn blobs(&self) -> &FirmwareBlobs<B> {
        &self.blobs
    }

    pub fn is_secure(&self) -> bool {
        matches!(self.blobs, FirmwareBlobs::Secure { .. })
    }

    /// Ucode image to copy into the falcon.
    ///
    /// For open firmware this is the `app_start_offset + app_size` bytes following the
    /// descriptor. Secure firmware returns its image blob.
    pub fn ns_ucode_image(&self) -> Result<&[u8], Error> {
        match &self.blobs {
            FirmwareBlobs::Open { ucode } => {
                let bytes = ucode.as_ref();
                let start = self.desc.descriptor_size as usize;
                let len = (self.desc.app_start_offset as usize)
                    .checked_add(self.desc.app_size as usize)
                    .ok_or(Error::MalformedDescriptor)?;
                let end = start.checked_add(len).ok_or(Error::MalformedDescriptor)?;

                bytes.get(start..end).ok_or(Error::MalformedDescriptor)
            }
            FirmwareBlobs::Secure { image, .. } => Ok(image.as_ref()),
        }
    }

    /// Hands the blobs back to `loader`, last acquired first.
    pub fn release<L: FirmwareLoader<Blob = B>>(self, loader: &mut L) {
        match self.blobs {
            FirmwareBlobs::Open { ucode } => loader.release(ucode),
            FirmwareBlobs::Secure { image, desc, sig } => {
                loader.release(sig);
                loader.release(desc);
                loader.release(image);
            }
        }
    }
}

/// Parses the descriptor and selects the ABI it calls for.
fn select(desc_bytes: &[u8]) -> Result<(UcodeDesc, AbiBundle), Error> {
    let desc = UcodeDesc::parse(desc_bytes).inspect_err(|_| {
        error!("Malformed PMU ucode descriptor");
    })?;
    let bundle = AbiBundle::select(desc.app_version).inspect_err(|_| {
        error!("PMU ucode app_version {} not supported", desc.app_version);
    })?;

    debug!(
        "PMU ucode app_version {} selects {:?}",
        desc.app_version,
        bundle.family()
    );
    Ok((desc, bundle))
}

fn request<L: FirmwareLoader>(loader: &mut L, name: &'static str) -> Result<L::Blob, Error> {
    debug!("requesting PMU ucode blob {name}");
    loader.request(name).ok_or_else(|| {
        error!("failed to load PMU ucode blob {name}");
        Error::FirmwareLoad { name }
    })
}

/// Loads the PMU ucode, secure if `priv_security` is set, and selects its ABI.
///
/// On failure every blob obtained so far is released, last acquired first.
pub fn load<L: FirmwareLoader>(
    loader: &mut L,
    priv_security: bool,
) -> Result<LoadedFirmware<L::Blob>, Error> {
    if !priv_security {
        let ucode = request(loader, NS_UCODE_BLOB)?;

        return match select(ucode.as_ref()) {
            Ok((desc, bundle)) => Ok(LoadedFirmware {
                blobs: FirmwareBlobs::Open { ucode },
                desc,
                bundle,
            }),
            Err(e) => {
                loader.release(ucode);
                Err(e)
            }
        };
    }

    let image = request(loader, UCODE_IMAGE_BLOB)?;

    let desc_blob = match request(loader, UCODE_DESC_BLOB) {
        Ok(blob) => blob,
        Err(e) => {
            loader.release(image);
            return Err(e);
        }
    };

    let sig = match request(loader, UCODE_SIG_BLOB) {
        Ok(blob) => blob,
        Err(e) => {
            loader.release(desc_blob);
            loader.release(image);
            return Err(e);
        }
    };

    match select(desc_blob.as_ref()) {
        Ok((desc, bundle)) => Ok(LoadedFirmware {
            blobs: FirmwareBlobs::Secure {
                image,
                desc: desc_blob,
                sig,
            },
            desc,
            bundle,
        }),
        Err(e) => {
            loader.release(sig);
            loader.release(desc_blob);
            loader.release(image);
            Err(e)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ChipFamily;
    use zerocopy::{FromZeros, IntoBytes};

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Event {
        Request(&'static str),
        Release(&'static str),
    }

    #[derive(Debug, PartialEq)]
    pub(crate) struct Blob {
        name: &'static str,
        data: Vec<u8>,
    }

    impl AsRef<[u8]> for Blob {
        fn as_ref(&self) -> &[u8] {
            &self.data
        }
    }

    #[derive(Default)]
    pub(crate) struct MockLoader {
        pub(crate) blobs: Vec<(&'static str, Vec<u8>)>,
        pub(crate) events: Vec<Event>,
    }

    impl MockLoader {
        pub(crate) fn with(mut self, name: &'static str, data: Vec<u8>) -> Self {
            self.blobs.push((name, data));
            self
        }

        pub(crate) fn releases(&self) -> Vec<&'static str> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Release(name) => Some(*name),
                    Event::Request(_) => None,
                })
                .collect()
        }
    }

    impl FirmwareLoader for MockLoader {
        type Blob = Blob;

        fn request(&mut self, name: &'static str) -> Option<Blob> {
            self.events.push(Event::Request(name));
            self.blobs
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, data)| Blob {
                    name,
                    data: data.clone(),
                })
        }

        fn release(&mut self, blob: Blob) {
            self.events.push(Event::Release(blob.name));
        }
    }

    pub(crate) fn desc_bytes(app_version: u32, app_start_offset: u32, app_size: u32) -> Vec<u8> {
        let mut raw = pmu_ucode_desc::new_zeroed();
        raw.descriptor_size = UcodeDesc::SIZE as u32;
        raw.image_size = UcodeDesc::SIZE as u32 + app_start_offset + app_size;
        raw.app_version = app_version;
        raw.app_start_offset = app_start_offset;
        raw.app_size = app_size;
        raw.date[..10].copy_from_slice(b"2019-06-12");
        raw.nb_overlays = 2;
        let mut load_ovl = raw.load_ovl;
        load_ovl[1] = [0x400, 0x200];
        raw.load_ovl = load_ovl;
        raw.as_bytes().to_vec()
    }

    pub(crate) fn open_blob(app_version: u32) -> Vec<u8> {
        let mut data = desc_bytes(app_version, 0x10, 0x20);
        data.extend((0..0x30).map(|i| i as u8));
        data
    }

    #[test]
    fn parse_descriptor() {
        assert_eq!(UcodeDesc::SIZE, 396);

        let desc = UcodeDesc::parse(&desc_bytes(25633490, 0x100, 0x2000)).unwrap();
        assert_eq!(desc.app_version, 25633490);
        assert_eq!(desc.descriptor_size, 396);
        assert_eq!(desc.app_start_offset, 0x100);
        assert_eq!(desc.app_size, 0x2000);
        assert_eq!(desc.date_str(), Some("2019-06-12"));
        assert_eq!(
            desc.overlays(),
            &[
                UcodeOverlay::default(),
                UcodeOverlay {
                    start: 0x400,
                    size: 0x200
                }
            ]
        );
    }

    #[test]
    fn short_descriptor() {
        let bytes = desc_bytes(20490253, 0, 0);
        assert_eq!(
            UcodeDesc::parse(&bytes[..395]),
            Err(Error::MalformedDescriptor)
        );
    }

    #[test]
    fn open_load() {
        let mut loader = MockLoader::default().with(NS_UCODE_BLOB, open_blob(20490253));

        let fw = load(&mut loader, false).unwrap();
        assert!(!fw.is_secure());
        assert_eq!(fw.bundle().family(), ChipFamily::Gm20b);
        assert_eq!(loader.events, [Event::Request(NS_UCODE_BLOB)]);

        let image = fw.ns_ucode_image().unwrap();
        assert_eq!(image.len(), 0x30);
        assert_eq!(image[0], 0);
        assert_eq!(image[0x2f], 0x2f);

        fw.release(&mut loader);
        assert_eq!(loader.releases(), [NS_UCODE_BLOB]);
    }

    #[test]
    fn open_blob_missing() {
        let mut loader = MockLoader::default();
        assert_eq!(
            load(&mut loader, false).err(),
            Some(Error::FirmwareLoad {
                name: NS_UCODE_BLOB
            })
        );
        assert!(loader.releases().is_empty());
    }

    #[test]
    fn open_unsupported_version_releases_blob() {
        let mut loader = MockLoader::default().with(NS_UCODE_BLOB, open_blob(0));
        assert_eq!(
            load(&mut loader, false).err(),
            Some(Error::UnsupportedVersion(0))
        );
        assert_eq!(loader.releases(), [NS_UCODE_BLOB]);
    }

    #[test]
    fn truncated_open_image() {
        let mut data = open_blob(20490253);
        data.truncate(UcodeDesc::SIZE + 0x2f);
        let mut loader = MockLoader::default().with(NS_UCODE_BLOB, data);

        let fw = load(&mut loader, false).unwrap();
        assert_eq!(fw.ns_ucode_image(), Err(Error::MalformedDescriptor));
    }

    #[test]
    fn secure_load() {
        let mut loader = MockLoader::default()
            .with(UCODE_IMAGE_BLOB, vec![0xaa; 64])
            .with(UCODE_DESC_BLOB, desc_bytes(25622342, 0, 64))
            .with(UCODE_SIG_BLOB, vec![0x55; 16]);

        let fw = load(&mut loader, true).unwrap();
        assert!(fw.is_secure());
        assert_eq!(fw.bundle().family(), ChipFamily::Tu10x);
        assert_eq!(fw.desc().app_size, 64);
        assert_eq!(fw.ns_ucode_image(), Ok(&[0xaa; 64][..]));
        assert_eq!(
            loader.events,
            [
                Event::Request(UCODE_IMAGE_BLOB),
                Event::Request(UCODE_DESC_BLOB),
                Event::Request(UCODE_SIG_BLOB)
            ]
        );

        fw.release(&mut loader);
        assert_eq!(
            loader.releases(),
            [UCODE_SIG_BLOB, UCODE_DESC_BLOB, UCODE_IMAGE_BLOB]
        );
    }

    #[test]
    fn secure_missing_signature_releases_in_reverse() {
        let mut loader = MockLoader::default()
            .with(UCODE_IMAGE_BLOB, vec![0xaa; 64])
            .with(UCODE_DESC_BLOB, desc_bytes(25622342, 0, 64));

        assert_eq!(
            load(&mut loader, true).err(),
            Some(Error::FirmwareLoad {
                name: UCODE_SIG_BLOB
            })
        );
        assert_eq!(loader.releases(), [UCODE_DESC_BLOB, UCODE_IMAGE_BLOB]);
    }

    #[test]
    fn secure_unsupported_version_releases_all() {
        let mut loader = MockLoader::default()
            .with(UCODE_IMAGE_BLOB, vec![0xaa; 64])
            .with(UCODE_DESC_BLOB, desc_bytes(7, 0, 64))
            .with(UCODE_SIG_BLOB, vec![0x55; 16]);

        assert_eq!(load(&mut loader, true).err(), Some(Error::UnsupportedVersion(7)));
        assert_eq!(
            loader.releases(),
            [UCODE_SIG_BLOB, UCODE_DESC_BLOB, UCODE_IMAGE_BLOB]
        );
    }

    #[test]
    fn secure_missing_image() {
        let mut loader = MockLoader::default()
            .with(UCODE_DESC_BLOB, desc_bytes(25622342, 0, 64))
            .with(UCODE_SIG_BLOB, vec![0x55; 16]);

        assert_eq!(
            load(&mut loader, true).err(),
            Some(Error::FirmwareLoad {
                name: UCODE_IMAGE_BLOB
            })
        );
        assert_eq!(loader.events, [Event::Request(UCODE_IMAGE_BLOB)]);
    }

    #[test]
    fn secure_missing_descriptor() {
        let mut loader = MockLoader::default().with(UCODE_IMAGE_BLOB, vec![0xaa; 64]);

        assert_eq!(
            load(&mut loader, true).err(),
            Some(Error::FirmwareLoad {
                name: UCODE_DESC_BLOB
            })
        );
        assert_eq!(loader.releases(), [UCODE_IMAGE_BLOB]);
        assert!(!loader.events.contains(&Event::Request(UCODE_SIG_BLOB)));
    }

    #[test]
    fn secure_malformed_descriptor_releases_all() {
        let mut loader = MockLoader::default()
            .with(UCODE_IMAGE_BLOB, vec![0xaa; 64])
            .with(UCODE_DESC_BLOB, vec![0; 100])
            .with(UCODE_SIG_BLOB, vec![0x55; 16]);

        assert_eq!(
            load(&mut loader, true).err(),
            Some(Error::MalformedDescriptor)
        );
        assert_eq!(
            loader.releases(),
            [UCODE_SIG_BLOB, UCODE_DESC_BLOB, UCODE_IMAGE_BLOB]
        );
    }
}
