// src/releases/model.rs
// =============================================================================
// This module defines the typed view of the GitHub releases API payload.
//
// The API returns big JSON objects; we only deserialize the handful of
// fields the statistics need (serde ignores the rest). Platform and
// build-variant classification is pure filename heuristics: CDDA asset
// names follow loose conventions like "cdda-windows-tiles-x64-....zip",
// so substring checks are all we have.
//
// Rust concepts:
// - serde derive: Deserialize straight into named, typed fields
// - Option<T>: API fields that can be null (label, name, published_at)
// - Methods on structs: Classification predicates live with the data
// =============================================================================

use serde::Deserialize;
use std::ops::AddAssign;
use tracing::warn;

// One downloadable file attached to a release
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub download_count: u64,
}

impl Asset {
    // The human-facing name: the label when one is set, the file name
    // otherwise
    pub fn display_name(&self) -> &str {
        match &self.label {
            Some(label) if !label.is_empty() => label,
            _ => &self.name,
        }
    }

    pub fn is_curses(&self) -> bool {
        self.name.to_lowercase().contains("curses")
    }

    // Android builds are always tiles builds even when the file name
    // doesn't say so
    pub fn is_tiles(&self) -> bool {
        self.name.to_lowercase().contains("tiles") || self.is_android()
    }

    pub fn is_mac(&self) -> bool {
        self.name.ends_with(".dmg")
    }

    pub fn is_windows(&self) -> bool {
        let name = self.name.to_lowercase();
        name.contains("windows") || name.contains("win")
    }

    pub fn is_linux(&self) -> bool {
        self.name.to_lowercase().contains("linux")
    }

    pub fn is_android(&self) -> bool {
        self.name.to_lowercase().ends_with("apk")
    }

    // Bitness is inferred by elimination: "x64" in the name means 64-bit,
    // mac and android ship 64-bit only, everything else counts as 32-bit
    pub fn is_32_bit(&self) -> bool {
        if self.name.to_lowercase().contains("x64") {
            return false;
        }
        if self.is_mac() || self.is_android() {
            return false;
        }
        true
    }

    pub fn is_64_bit(&self) -> bool {
        !self.is_32_bit()
    }
}

// One release with its downloadable assets
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    // The human-facing name: releases occasionally have a null name, in
    // which case the tag carries the information
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => &self.tag_name,
        }
    }

    // Sorts assets for stable report output and warns about file names the
    // classification heuristics don't recognize
    pub fn normalize(&mut self) {
        for asset in &self.assets {
            if !(asset.is_android() || asset.is_linux() || asset.is_mac() || asset.is_windows()) {
                warn!("asset '{}' matches no known platform", asset.name);
            }
            if !(asset.is_curses() || asset.is_tiles()) {
                warn!("asset '{}' matches no known build variant", asset.name);
            }
        }
        self.assets
            .sort_by(|a, b| a.display_name().cmp(b.display_name()));
    }

    pub fn total_downloads(&self) -> u64 {
        self.assets.iter().map(|a| a.download_count).sum()
    }

    // Download counts bucketed per operating system. An asset whose name
    // matches several platforms is counted in each of them.
    pub fn downloads_per_os(&self) -> OsDownloads {
        let mut totals = OsDownloads::default();
        for asset in &self.assets {
            if asset.is_android() {
                totals.android += asset.download_count;
            }
            if asset.is_linux() {
                totals.linux += asset.download_count;
            }
            if asset.is_mac() {
                totals.osx += asset.download_count;
            }
            if asset.is_windows() {
                totals.windows += asset.download_count;
            }
        }
        totals
    }
}

// Aggregated download counts per operating system
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OsDownloads {
    pub android: u64,
    pub linux: u64,
    pub osx: u64,
    pub windows: u64,
}

impl OsDownloads {
    // The buckets with their report labels, in report order
    pub fn named(&self) -> [(&'static str, u64); 4] {
        [
            ("Android", self.android),
            ("Linux", self.linux),
            ("OSX", self.osx),
            ("Windows", self.windows),
        ]
    }
}

impl AddAssign for OsDownloads {
    fn add_assign(&mut self, other: OsDownloads) {
        self.android += other.android;
        self.linux += other.linux;
        self.osx += other.osx;
        self.windows += other.windows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str, count: u64) -> Asset {
        Asset {
            name: name.to_string(),
            label: None,
            download_count: count,
        }
    }

    #[test]
    fn test_classification_windows_tiles() {
        let a = asset("cdda-windows-tiles-x64-2021.zip", 1);
        assert!(a.is_windows());
        assert!(a.is_tiles());
        assert!(!a.is_curses());
        assert!(!a.is_linux());
        assert!(a.is_64_bit());
    }

    #[test]
    fn test_classification_linux_curses_32_bit() {
        let a = asset("cdda-linux-curses-2021.tar.gz", 1);
        assert!(a.is_linux());
        assert!(a.is_curses());
        assert!(a.is_32_bit());
        assert!(!a.is_64_bit());
    }

    #[test]
    fn test_classification_mac_and_android() {
        let mac = asset("Cataclysm-2021.dmg", 1);
        assert!(mac.is_mac());
        assert!(mac.is_64_bit());

        let android = asset("cdda-2021.apk", 1);
        assert!(android.is_android());
        // Android implies tiles and 64-bit
        assert!(android.is_tiles());
        assert!(android.is_64_bit());
    }

    #[test]
    fn test_display_name_prefers_label() {
        let mut a = asset("raw-file-name.zip", 1);
        assert_eq!(a.display_name(), "raw-file-name.zip");
        a.label = Some("Windows Tiles x64".to_string());
        assert_eq!(a.display_name(), "Windows Tiles x64");
        // An empty label falls back to the file name
        a.label = Some(String::new());
        assert_eq!(a.display_name(), "raw-file-name.zip");
    }

    #[test]
    fn test_release_totals_and_per_os() {
        let mut release: Release = serde_json::from_str(
            r#"{
                "tag_name": "0.F-3",
                "name": "Frank-3",
                "published_at": "2021-01-01T00:00:00Z",
                "assets": [
                    {"name": "cdda-windows-tiles-x64.zip", "download_count": 10},
                    {"name": "cdda-linux-tiles-x64.tar.gz", "download_count": 5},
                    {"name": "cdda.apk", "download_count": 2}
                ]
            }"#,
        )
        .unwrap();
        release.normalize();

        assert_eq!(release.total_downloads(), 17);
        let per_os = release.downloads_per_os();
        assert_eq!(per_os.windows, 10);
        assert_eq!(per_os.linux, 5);
        assert_eq!(per_os.android, 2);
        assert_eq!(per_os.osx, 0);
    }

    #[test]
    fn test_normalize_sorts_assets_by_display_name() {
        let mut release = Release {
            tag_name: "t".to_string(),
            name: None,
            published_at: None,
            assets: vec![asset("b-windows.zip", 1), asset("a-windows.zip", 2)],
        };
        release.normalize();
        assert_eq!(release.assets[0].name, "a-windows.zip");
        assert_eq!(release.display_name(), "t");
    }

    #[test]
    fn test_unknown_json_fields_are_ignored() {
        let release: Release = serde_json::from_str(
            r#"{"tag_name": "x", "draft": false, "prerelease": true, "assets": []}"#,
        )
        .unwrap();
        assert_eq!(release.tag_name, "x");
        assert_eq!(release.total_downloads(), 0);
    }

    #[test]
    fn test_os_downloads_accumulate() {
        let mut total = OsDownloads::default();
        total += OsDownloads {
            android: 1,
            linux: 2,
            osx: 3,
            windows: 4,
        };
        total += OsDownloads {
            android: 10,
            linux: 20,
            osx: 30,
            windows: 40,
        };
        assert_eq!(
            total.named(),
            [
                ("Android", 11),
                ("Linux", 22),
                ("OSX", 33),
                ("Windows", 44),
            ]
        );
    }
}
