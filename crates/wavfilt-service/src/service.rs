// SPDX-License-Identifier: LGPL-3.0-or-later

//! The service facade the dashboard endpoints map onto.
//!
//! [`FilterService`] owns the store and two explicit caches: decoded
//! sources keyed by stored file name, and filtered variants keyed by
//! source name plus the canonical filter fingerprint. Variants are
//! write-once: a repeated request returns the existing reference, a new
//! spec creates a new variant, and earlier references stay valid.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use wavfilt_dsp_units::analysis::ResponseAnalyzer;
use wavfilt_dsp_units::analysis::spectrum::signal_spectrum;
use wavfilt_dsp_units::analysis::waveform::normalized_waveform;
use wavfilt_dsp_units::filters::{DesignedFilter, FilterSpec, apply, design};
use wavfilt_dsp_units::misc::windows::WindowType;
use wavfilt_dsp_units::plot::{PlotBundle, PlotSeries, serialize};
use wavfilt_dsp_units::signal::SignalBuffer;

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::request::FilterRequest;
use crate::store::{DirStore, MemoryStore, SignalStore, check_name};
use crate::wav;

// ── Response documents ─────────────────────────────────────────────

/// Reply to an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadMetadata {
    /// Name the file was stored under.
    pub filename: String,
    pub sample_rate: u32,
    /// Seconds, rounded to two decimals.
    pub duration: f64,
    pub channels: usize,
}

/// Reply to a filter application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResponse {
    pub message: String,
    pub filter_file: String,
    pub download_url: String,
    pub filtered_audio_url: String,
}

/// Reply to a plot-data request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotResponse {
    pub plot_data: PlotBundle,
}

// ── Caches ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VariantKey {
    source: String,
    fingerprint: String,
}

#[derive(Debug, Clone)]
struct Variant {
    name: String,
    filter: DesignedFilter,
    filtered: SignalBuffer,
}

/// Dashboard service: upload, apply, plot, waveform, spectrum and fetch.
///
/// `FilterService` is `Send + Sync`; share it behind an `Arc` between
/// request handlers.
pub struct FilterService {
    config: ServiceConfig,
    analyzer: ResponseAnalyzer,
    store: Arc<dyn SignalStore>,
    sources: RwLock<HashMap<String, SignalBuffer>>,
    variants: RwLock<HashMap<VariantKey, Variant>>,
}

impl FilterService {
    /// Service over an arbitrary store.
    pub fn new(config: ServiceConfig, store: Arc<dyn SignalStore>) -> Self {
        let analyzer = config.analyzer();
        Self {
            config,
            analyzer,
            store,
            sources: RwLock::new(HashMap::new()),
            variants: RwLock::new(HashMap::new()),
        }
    }

    /// Service storing files under `config.media_root`.
    pub fn open(config: ServiceConfig) -> ServiceResult<Self> {
        let store = DirStore::open(&config.media_root)?;
        Ok(Self::new(config, Arc::new(store)))
    }

    /// Service with a process-local in-memory store.
    pub fn in_memory(config: ServiceConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Decode and store an uploaded WAV file.
    ///
    /// The file is stored under `filename` unless that name already holds
    /// different bytes, in which case `<stem>_<n>.<ext>` with the first
    /// free `n` is used. Re-uploading identical bytes reuses the name.
    pub fn upload(&self, filename: &str, bytes: &[u8]) -> ServiceResult<UploadMetadata> {
        self.upload_inner(filename, bytes).inspect_err(|e| log_failure("upload", e))
    }

    fn upload_inner(&self, filename: &str, bytes: &[u8]) -> ServiceResult<UploadMetadata> {
        check_name(filename)?;
        let signal = wav::decode(bytes)?;
        let stored = self.store_unique(filename, bytes)?;
        info!(
            "upload: {stored} ({} ch, {} Hz, {:.2} s)",
            signal.channel_count(),
            signal.sample_rate(),
            signal.duration()
        );
        let meta = metadata_of(&stored, &signal);
        self.cache_source(&stored, signal)?;
        Ok(meta)
    }

    /// Metadata of an already stored file.
    pub fn metadata(&self, filename: &str) -> ServiceResult<UploadMetadata> {
        let signal = self.source(filename).inspect_err(|e| log_failure("metadata", e))?;
        Ok(metadata_of(filename, &signal))
    }

    /// Filter a stored source and persist the result as a variant.
    pub fn apply(&self, source: &str, request: &FilterRequest) -> ServiceResult<ApplyResponse> {
        let result = request
            .to_spec()
            .map_err(ServiceError::from)
            .and_then(|spec| Ok((self.variant(source, &spec)?, spec)));
        let (variant, spec) = result.inspect_err(|e| log_failure("apply", e))?;
        let download_url = format!("{}{}", self.config.media_url, variant.name);
        Ok(ApplyResponse {
            message: format!("{} pass filter applied", spec.kind),
            filter_file: variant.name,
            download_url: download_url.clone(),
            filtered_audio_url: download_url,
        })
    }

    /// Frequency, impulse and time-domain plots for a request on a stored
    /// source. The time-domain plot is the persisted variant's audio.
    pub fn plot(&self, source: &str, request: &FilterRequest) -> ServiceResult<PlotResponse> {
        self.plot_inner(source, request).inspect_err(|e| log_failure("plot", e))
    }

    fn plot_inner(&self, source: &str, request: &FilterRequest) -> ServiceResult<PlotResponse> {
        let spec = request.to_spec()?;
        let variant = self.variant(source, &spec)?;
        let responses = self.analyzer.analyze(&variant.filter, &variant.filtered)?;
        Ok(PlotResponse {
            plot_data: PlotBundle::decimated(&responses, self.config.max_plot_points),
        })
    }

    /// Phase response in radians of the filter a request designs for a
    /// stored source.
    pub fn phase(&self, source: &str, request: &FilterRequest) -> ServiceResult<PlotSeries> {
        let result = request.to_spec().map_err(ServiceError::from).and_then(|spec| {
            let signal = self.source(source)?;
            let filter = design(&spec, signal.sample_rate())?;
            let curve = self.analyzer.phase_response(&filter)?;
            Ok(serialize(&curve, curve.title()))
        });
        result.inspect_err(|e| log_failure("phase", e))
    }

    /// Peak-normalized waveform of one channel of a stored source.
    pub fn waveform(&self, source: &str, channel: usize) -> ServiceResult<PlotSeries> {
        let result = self.source(source).and_then(|signal| {
            let curve = normalized_waveform(&signal, channel)?.decimated(self.config.max_plot_points);
            Ok(serialize(&curve, curve.title()))
        });
        result.inspect_err(|e| log_failure("waveform", e))
    }

    /// Magnitude spectrum of one channel of a stored source.
    pub fn spectrum(
        &self,
        source: &str,
        channel: usize,
        window: WindowType,
    ) -> ServiceResult<PlotSeries> {
        let result = self.source(source).and_then(|signal| {
            let curve = signal_spectrum(&signal, channel, window)?
                .decimated(self.config.max_plot_points);
            Ok(serialize(&curve, curve.title()))
        });
        result.inspect_err(|e| log_failure("spectrum", e))
    }

    /// Stored WAV bytes of an original or filtered file.
    pub fn fetch(&self, filename: &str) -> ServiceResult<Arc<[u8]>> {
        self.store
            .get(filename)
            .inspect_err(|e| log_failure("fetch", e))
    }

    // ── internals ──────────────────────────────────────────────────

    /// Store `bytes` under `filename`, or under `<stem>_<n><ext>` with the
    /// first `n` whose entry is free or already holds the same bytes.
    fn store_unique(&self, filename: &str, bytes: &[u8]) -> ServiceResult<String> {
        let path = Path::new(filename);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut name = filename.to_owned();
        let mut n = 0u32;
        loop {
            if self.store.put_if_absent(&name, bytes)? || *self.store.get(&name)? == *bytes {
                return Ok(name);
            }
            n += 1;
            name = format!("{stem}_{n}{ext}");
        }
    }

    fn cache_source(&self, name: &str, signal: SignalBuffer) -> ServiceResult<SignalBuffer> {
        let mut sources = self
            .sources
            .write()
            .map_err(|_| ServiceError::Poisoned("source cache"))?;
        Ok(sources.entry(name.to_owned()).or_insert(signal).clone())
    }

    /// Decoded source, from cache or store.
    fn source(&self, name: &str) -> ServiceResult<SignalBuffer> {
        check_name(name)?;
        {
            let sources = self
                .sources
                .read()
                .map_err(|_| ServiceError::Poisoned("source cache"))?;
            if let Some(signal) = sources.get(name) {
                return Ok(signal.clone());
            }
        }
        let signal = wav::decode(&self.store.get(name)?)?;
        self.cache_source(name, signal)
    }

    /// Filtered variant of `source` for `spec`, computed and stored on the
    /// first request only.
    fn variant(&self, source: &str, spec: &FilterSpec) -> ServiceResult<Variant> {
        let key = VariantKey {
            source: source.to_owned(),
            fingerprint: spec.fingerprint(),
        };
        {
            let variants = self
                .variants
                .read()
                .map_err(|_| ServiceError::Poisoned("variant cache"))?;
            if let Some(v) = variants.get(&key) {
                return Ok(v.clone());
            }
        }

        let signal = self.source(source)?;
        let filter = design(spec, signal.sample_rate())?;
        let filtered = apply(&filter, &signal)?;
        let wanted = variant_name(source, spec);
        let name = self.store_unique(&wanted, &wav::encode(&filtered)?)?;
        if name != wanted {
            warn!("apply: {wanted} holds other audio, storing as {name}");
        }
        info!("apply: {source} -> {name}");

        let variant = Variant {
            name,
            filter,
            filtered,
        };
        let mut variants = self
            .variants
            .write()
            .map_err(|_| ServiceError::Poisoned("variant cache"))?;
        Ok(variants.entry(key).or_insert(variant).clone())
    }
}

/// `<stem>_<type>_<cutoff>Hz_o<order>.wav`, band edges joined by `-`.
pub fn variant_name(source: &str, spec: &FilterSpec) -> String {
    let stem = Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!(
        "{stem}_{}_{}Hz_o{}.wav",
        spec.kind.wire_name(),
        spec.cutoff,
        spec.order
    )
}

fn metadata_of(filename: &str, signal: &SignalBuffer) -> UploadMetadata {
    UploadMetadata {
        filename: filename.to_owned(),
        sample_rate: signal.sample_rate(),
        duration: (signal.duration() * 100.0).round() / 100.0,
        channels: signal.channel_count(),
    }
}

fn log_failure(op: &str, e: &ServiceError) {
    if e.status() >= 500 {
        error!("{op}: {e}");
    } else {
        warn!("{op}: rejected: {e}");
    }
}
