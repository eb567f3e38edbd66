//! `iccauto.json`: calibration, timing and working file locations.
//!
//! Every key is optional; anything missing takes its default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::settle::Settle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Probe positions and reference colors for the driven application.
    pub calibration: ie::Calibration,

    /// Iterations without a page turn before report navigation gives up.
    pub max_attempts: u32,

    pub settle: Settle,

    /// Pause between moving the pointer and clicking (milliseconds).
    pub click_delay_ms: u64,

    /// Grace period before the first input is sent (milliseconds).
    pub start_delay_ms: u64,

    pub files: Files,
}

/// Working files, relative to the current directory unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Files {
    /// One MRN per line.
    pub mrn: PathBuf,
    /// Last successfully processed MRN, for resuming.
    pub last_patient: PathBuf,
    /// Step list (`locations.json`).
    pub steps: PathBuf,
    /// Debug snapshots.
    pub log_dir: PathBuf,
    pub step_log: PathBuf,
    pub patient_log: PathBuf,
}

impl Default for Files {
    fn default() -> Self {
        Self {
            mrn: "MRN.txt".into(),
            last_patient: "LastPatient.txt".into(),
            steps: "locations.json".into(),
            log_dir: "Log".into(),
            step_log: "StepLog.txt".into(),
            patient_log: "PatientLog.txt".into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calibration: ie::Calibration::default(),
            max_attempts: 10,
            settle: Settle::default(),
            click_delay_ms: 500,
            start_delay_ms: 5000,
            files: Files::default(),
        }
    }
}

impl Config {
    /// Default path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("iccauto.json"))
    }

    #[inline]
    pub fn click_delay(&self) -> Duration {
        Duration::from_millis(self.click_delay_ms)
    }

    #[inline]
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    /// Try to load configuration from disk. A missing file yields defaults.
    pub fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
        let cfg = serde_json::from_str(&json).with_context(|| format!("parse {:?}", path))?;
        Ok(cfg)
    }

    /// Write pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, json).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }
}
