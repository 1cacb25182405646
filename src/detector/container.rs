//! Container and file-format signatures.
//!
//! Decoded bytes that start with a known magic number are reported, never
//! unpacked.

/// A file-format magic number
#[derive(Debug, Clone)]
pub struct ContainerSignature {
    /// Format name
    pub name: &'static str,
    /// Leading bytes
    pub magic: &'static [u8],
    /// Whether the format is compressed
    pub compressed: bool,
}

/// Known signatures, longest magic first where prefixes overlap
pub static CONTAINERS: &[ContainerSignature] = &[
    ContainerSignature {
        name: "7z",
        magic: &[0x37, 0x7a, 0xbc, 0xaf, 0x27, 0x1c],
        compressed: true,
    },
    ContainerSignature {
        name: "xz",
        magic: &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00],
        compressed: true,
    },
    ContainerSignature {
        name: "RAR",
        magic: b"Rar!\x1a\x07",
        compressed: true,
    },
    ContainerSignature {
        name: "PNG",
        magic: &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
        compressed: false,
    },
    ContainerSignature {
        name: "ZIP",
        magic: b"PK\x03\x04",
        compressed: true,
    },
    ContainerSignature {
        name: "PDF",
        magic: b"%PDF-",
        compressed: false,
    },
    ContainerSignature {
        name: "ELF",
        magic: b"\x7fELF",
        compressed: false,
    },
    ContainerSignature {
        name: "bzip2",
        magic: b"BZh",
        compressed: true,
    },
    ContainerSignature {
        name: "gzip",
        magic: &[0x1f, 0x8b],
        compressed: true,
    },
    ContainerSignature {
        name: "zlib",
        magic: &[0x78, 0x9c],
        compressed: true,
    },
    ContainerSignature {
        name: "zlib",
        magic: &[0x78, 0xda],
        compressed: true,
    },
    ContainerSignature {
        name: "zlib",
        magic: &[0x78, 0x01],
        compressed: true,
    },
];

/// First signature whose magic prefixes `bytes`
pub fn sniff(bytes: &[u8]) -> Option<&'static ContainerSignature> {
    CONTAINERS.iter().find(|c| bytes.starts_with(c.magic))
}

/// Warning text for a recognised container
pub fn container_warning(signature: &ContainerSignature) -> String {
    if signature.compressed {
        format!(
            "Decoded data is {} compressed data; decompression is not supported",
            signature.name
        )
    } else {
        format!("Decoded data is a {} file", signature.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(sniff(&[0x1f, 0x8b, 0x08, 0x00]).unwrap().name, "gzip");
        assert_eq!(sniff(b"PK\x03\x04rest").unwrap().name, "ZIP");
        assert_eq!(sniff(b"%PDF-1.7").unwrap().name, "PDF");
        assert_eq!(sniff(&[0x78, 0x9c, 0x4b]).unwrap().name, "zlib");
        assert!(sniff(b"Hello World").is_none());
        assert!(sniff(&[]).is_none());
    }

    #[test]
    fn test_warning_mentions_format() {
        let gzip = sniff(&[0x1f, 0x8b]).unwrap();
        assert!(container_warning(gzip).contains("gzip"));
        assert!(container_warning(gzip).contains("not supported"));
    }
}
