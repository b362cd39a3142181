//! Microphone capture and loudness analysis.
//!
//! A cpal input stream pushes mono samples into a shared buffer; an analysis
//! thread windows them, runs a 256-point FFT and publishes 128 byte-scaled
//! magnitude bins. The game never waits on any of this: it polls the latest
//! snapshot once per tick, and a missing or silent microphone just reads as
//! loudness zero.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const FFT_SIZE: usize = 256;
pub const BIN_COUNT: usize = FFT_SIZE / 2;

/// Byte scaling range, matching Web Audio's `getByteFrequencyData`:
/// -100 dB maps to 0 and -30 dB maps to 255.
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

/// How often the analysis thread looks for a full window.
const ANALYSIS_INTERVAL: Duration = Duration::from_millis(16);

/// Cap on buffered capture so a slow analyser never grows it unbounded.
const MAX_BACKLOG: usize = FFT_SIZE * 8;

pub struct Microphone {
    magnitudes: Arc<Mutex<[u8; BIN_COUNT]>>,
    ready: Arc<AtomicBool>,
    _stream: Option<cpal::Stream>,
    _analysis: Option<thread::JoinHandle<()>>,
}

impl Microphone {
    /// Open the default input device and start capture + analysis.
    pub fn open() -> Result<Self, String> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or("no input device found")?;
        let config = device
            .default_input_config()
            .map_err(|e| format!("failed to get input config: {}", e))?;
        let channels = config.channels() as usize;

        let samples = Arc::new(Mutex::new(Vec::<f32>::new()));
        let samples_capture = Arc::clone(&samples);

        let stream = device
            .build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mut buf = samples_capture.lock().unwrap();
                    // First channel only; loudness doesn't care about stereo.
                    buf.extend(data.iter().step_by(channels));
                    let len = buf.len();
                    if len > MAX_BACKLOG {
                        buf.drain(0..len - MAX_BACKLOG / 2);
                    }
                },
                |err| eprintln!("input stream error: {}", err),
                None,
            )
            .map_err(|e| format!("failed to build input stream: {}", e))?;
        stream
            .play()
            .map_err(|e| format!("failed to start input stream: {}", e))?;

        let magnitudes = Arc::new(Mutex::new([0u8; BIN_COUNT]));
        let ready = Arc::new(AtomicBool::new(true));
        let analysis = spawn_analysis_thread(samples, Arc::clone(&magnitudes));

        Ok(Microphone {
            magnitudes,
            ready,
            _stream: Some(stream),
            _analysis: Some(analysis),
        })
    }

    /// A microphone that never hears anything, for when acquisition fails.
    pub fn disabled() -> Self {
        Microphone {
            magnitudes: Arc::new(Mutex::new([0u8; BIN_COUNT])),
            ready: Arc::new(AtomicBool::new(false)),
            _stream: None,
            _analysis: None,
        }
    }

    pub fn ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    /// Snapshot of the most recent frequency magnitudes.
    pub fn latest_magnitudes(&self) -> [u8; BIN_COUNT] {
        match self.magnitudes.lock() {
            Ok(bins) => *bins,
            Err(_) => [0; BIN_COUNT],
        }
    }

    /// Unweighted mean of the latest bins; 0.0 when no microphone is ready.
    pub fn loudness(&self) -> f64 {
        if !self.ready() {
            return 0.0;
        }
        mean_magnitude(&self.latest_magnitudes())
    }
}

/// Periodically window + FFT the capture buffer and publish byte magnitudes.
/// Windows overlap by half, draining only `FFT_SIZE / 2` samples per pass.
fn spawn_analysis_thread(
    samples: Arc<Mutex<Vec<f32>>>,
    magnitudes: Arc<Mutex<[u8; BIN_COUNT]>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        let mut window = vec![Complex::new(0.0f32, 0.0); FFT_SIZE];

        loop {
            thread::sleep(ANALYSIS_INTERVAL);

            let mut buf = samples.lock().unwrap();
            if buf.len() < FFT_SIZE {
                continue;
            }
            for (i, slot) in window.iter_mut().enumerate() {
                *slot = Complex::new(buf[i] * hann_window(i, FFT_SIZE), 0.0);
            }
            buf.drain(0..FFT_SIZE / 2);
            drop(buf);

            fft.process(&mut window);

            let mut bins = [0u8; BIN_COUNT];
            for (bin, out) in bins.iter_mut().zip(window.iter()) {
                *bin = byte_magnitude(out.norm());
            }
            *magnitudes.lock().unwrap() = bins;
        }
    })
}

fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

/// Scale one FFT magnitude to a byte on the dB range `MIN_DB..MAX_DB`.
fn byte_magnitude(norm: f32) -> u8 {
    let amplitude = norm * 2.0 / FFT_SIZE as f32;
    let db = 20.0 * amplitude.max(1e-10).log10();
    let scaled = (db - MIN_DB) / (MAX_DB - MIN_DB);
    (scaled.clamp(0.0, 1.0) * 255.0) as u8
}

pub fn mean_magnitude(bins: &[u8]) -> f64 {
    if bins.is_empty() {
        return 0.0;
    }
    bins.iter().map(|&b| b as f64).sum::<f64>() / bins.len() as f64
}
