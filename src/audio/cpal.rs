// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{collections::HashMap, fmt, sync::Arc, thread};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, span, Level};

use crate::audio::mixer::{VoiceEvent, VoiceMixer};
use crate::audio::{
    decode, AudioBuffer, AudioError, Device as AudioDevice, OnEnded, VoiceChain, VoiceHandle,
    VoiceId,
};

/// Voices the render thread can hold before its voice list reallocates.
const MIXER_CAPACITY: usize = 32;

/// Pending voice-ended notifications between the render and completion threads.
const EVENT_QUEUE_SIZE: usize = 256;

type Callbacks = Arc<Mutex<HashMap<VoiceId, OnEnded>>>;

/// A small wrapper around a cpal::Device. Used for storing the output format and the
/// output stream once it has been opened.
pub struct Device {
    /// The name of the device.
    name: String,
    /// The host ID of the device.
    host_id: cpal::HostId,
    /// The underlying cpal device.
    device: cpal::Device,
    /// Number of output channels of the default output config.
    num_channels: u16,
    /// Output sample rate. Decoded samples are resampled to this rate.
    sample_rate: u32,
    /// Output sample format.
    sample_format: cpal::SampleFormat,
    /// The output stream manager, present once the device is open.
    output: Mutex<Option<OutputManager>>,
}

/// Owns the output stream thread and the thread that delivers voice-ended notifications.
struct OutputManager {
    /// Channel for handing new voices to the render callback.
    voice_tx: Sender<(VoiceChain, VoiceHandle)>,
    /// Callbacks for voices that have not ended yet.
    callbacks: Callbacks,
    /// Dropping this stops the output thread.
    shutdown_tx: Option<Sender<()>>,
    /// Handle to the output thread (keeps the stream alive).
    output_thread: Option<thread::JoinHandle<()>>,
    /// Handle to the completion thread.
    completion_thread: Option<thread::JoinHandle<()>>,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Channels={}, {}Hz) ({})",
            self.name,
            self.num_channels,
            self.sample_rate,
            self.host_id.name()
        )
    }
}

impl Drop for OutputManager {
    fn drop(&mut self) {
        // Closing the shutdown channel releases the stream, which closes the event channel.
        self.shutdown_tx.take();
        if let Some(thread) = self.output_thread.take() {
            let _ = thread.join();
        }
        if let Some(thread) = self.completion_thread.take() {
            let _ = thread.join();
        }
        self.callbacks.lock().clear();
    }
}

/// Builds an output stream that renders the mixer into samples of type T.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: VoiceMixer,
    voice_rx: Receiver<(VoiceChain, VoiceHandle)>,
    event_tx: Sender<VoiceEvent>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mut scratch: Vec<f32> = Vec::new();
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            while let Ok((chain, handle)) = voice_rx.try_recv() {
                mixer.add_voice(chain, handle);
            }

            scratch.resize(data.len(), 0.0);
            mixer.render(&mut scratch, |event| {
                let _ = event_tx.try_send(event);
            });

            for (dst, &src) in data.iter_mut().zip(scratch.iter()) {
                *dst = T::from_sample(src);
            }
        },
        |err| error!("CPAL output stream error: {}", err),
        None,
    )
}

impl OutputManager {
    /// Starts the output and completion threads. Returns once the stream is playing.
    fn start(
        device: cpal::Device,
        num_channels: u16,
        sample_rate: u32,
        sample_format: cpal::SampleFormat,
        master_gain: f32,
    ) -> Result<OutputManager, AudioError> {
        let (voice_tx, voice_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::bounded::<VoiceEvent>(EVENT_QUEUE_SIZE);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), String>>(1);

        // The stream is created inside the thread that owns it.
        let output_thread = thread::spawn(move || {
            let config = cpal::StreamConfig {
                channels: num_channels,
                sample_rate,
                buffer_size: cpal::BufferSize::Default,
            };
            let mixer = VoiceMixer::new(num_channels, master_gain, MIXER_CAPACITY);

            let stream_result = match sample_format {
                cpal::SampleFormat::F32 => {
                    build_stream::<f32>(&device, &config, mixer, voice_rx, event_tx)
                }
                cpal::SampleFormat::I16 => {
                    build_stream::<i16>(&device, &config, mixer, voice_rx, event_tx)
                }
                cpal::SampleFormat::I32 => {
                    build_stream::<i32>(&device, &config, mixer, voice_rx, event_tx)
                }
                cpal::SampleFormat::U16 => {
                    build_stream::<u16>(&device, &config, mixer, voice_rx, event_tx)
                }
                other => {
                    let _ = ready_tx.send(Err(format!("unsupported sample format {}", other)));
                    return;
                }
            };

            let stream = match stream_result {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            if let Err(e) = stream.play() {
                let _ = ready_tx.send(Err(e.to_string()));
                return;
            }
            let _ = ready_tx.send(Ok(()));

            // Keep the stream alive until the manager goes away.
            let _ = shutdown_rx.recv();
            drop(stream);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = output_thread.join();
                return Err(AudioError::Stream(e));
            }
            Err(_) => {
                let _ = output_thread.join();
                return Err(AudioError::Stream("output thread exited".to_string()));
            }
        }

        let callbacks: Callbacks = Arc::new(Mutex::new(HashMap::new()));
        let completion_thread = {
            let callbacks = callbacks.clone();
            thread::spawn(move || {
                for event in event_rx.iter() {
                    match event {
                        VoiceEvent::Ended(id) => {
                            let on_ended = callbacks.lock().remove(&id);
                            if let Some(on_ended) = on_ended {
                                on_ended();
                            }
                        }
                        VoiceEvent::Dropped(id) => {
                            callbacks.lock().remove(&id);
                        }
                    }
                }
            })
        };

        Ok(OutputManager {
            voice_tx,
            callbacks,
            shutdown_tx: Some(shutdown_tx),
            output_thread: Some(output_thread),
            completion_thread: Some(completion_thread),
        })
    }

    /// Hands a voice to the render callback.
    fn add_voice(&self, chain: VoiceChain, on_ended: OnEnded) -> Result<VoiceHandle, AudioError> {
        let handle = VoiceHandle::new();
        let id = chain.id;
        // Register before the voice can possibly end.
        self.callbacks.lock().insert(id, on_ended);
        if self.voice_tx.send((chain, handle.clone())).is_err() {
            self.callbacks.lock().remove(&id);
            return Err(AudioError::Stream("output stream has stopped".to_string()));
        }
        Ok(handle)
    }
}

impl Device {
    /// Lists cpal devices and produces the Device trait.
    pub fn list() -> Result<Vec<Box<dyn AudioDevice>>, AudioError> {
        Ok(Device::list_cpal_devices()?
            .into_iter()
            .map(|device| {
                let device: Box<dyn AudioDevice> = Box::new(device);
                device
            })
            .collect())
    }

    /// Lists cpal devices that have a default output configuration.
    fn list_cpal_devices() -> Result<Vec<Device>, AudioError> {
        // Suppress noisy output here.
        let _shh_stdout = shh::stdout().ok();
        let _shh_stderr = shh::stderr().ok();

        let mut devices: Vec<Device> = Vec::new();
        for host_id in cpal::available_hosts() {
            let host = match cpal::host_from_id(host_id) {
                Ok(host) => host,
                Err(e) => {
                    error!(err = e.to_string(), host = host_id.name(), "Host unavailable");
                    continue;
                }
            };
            let host_devices = match host.devices() {
                Ok(host_devices) => host_devices,
                Err(e) => {
                    error!(
                        err = e.to_string(),
                        host = host_id.name(),
                        "Unable to list devices for host"
                    );
                    continue;
                }
            };

            for device in host_devices {
                if let Ok(device) = Device::from_cpal(host_id, device) {
                    devices.push(device);
                }
            }
        }

        devices.sort_by_key(|device| device.name.to_string());
        Ok(devices)
    }

    /// Wraps a cpal device using its default output configuration.
    fn from_cpal(host_id: cpal::HostId, device: cpal::Device) -> Result<Device, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::Stream(e.to_string()))?;
        let config = device
            .default_output_config()
            .map_err(|e| AudioError::Stream(e.to_string()))?;

        Ok(Device {
            name,
            host_id,
            device,
            num_channels: config.channels(),
            sample_rate: config.sample_rate(),
            sample_format: config.sample_format(),
            output: Mutex::new(None),
        })
    }

    /// Gets the cpal device with the given name.
    pub fn get(name: &str) -> Result<Device, AudioError> {
        Device::list_cpal_devices()?
            .into_iter()
            .find(|device| device.name.trim() == name)
            .ok_or_else(|| AudioError::NoDevice(name.to_string()))
    }

    /// Gets the default output device of the default host.
    pub fn default_output() -> Result<Device, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::NoDevice("default".to_string()))?;
        Device::from_cpal(host.id(), device)
    }
}

impl AudioDevice for Device {
    fn open(&self, master_gain: f32) -> Result<(), AudioError> {
        let mut output = self.output.lock();
        if output.is_some() {
            return Ok(());
        }

        let span = span!(Level::INFO, "open output (cpal)");
        let _enter = span.enter();

        *output = Some(OutputManager::start(
            self.device.clone(),
            self.num_channels,
            self.sample_rate,
            self.sample_format,
            master_gain,
        )?);

        info!(
            device = self.name,
            channels = self.num_channels,
            sample_rate = self.sample_rate,
            format = %self.sample_format,
            master_gain,
            "CPAL output stream started"
        );
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.output.lock().is_some()
    }

    fn decode(&self, encoded: &[u8]) -> Result<AudioBuffer, AudioError> {
        Ok(decode::decode(encoded, None)?.resampled(self.sample_rate))
    }

    fn start(&self, chain: VoiceChain, on_ended: OnEnded) -> Result<VoiceHandle, AudioError> {
        let output = self.output.lock();
        let output = output.as_ref().ok_or(AudioError::NotOpen)?;
        debug!(voice = %chain.id, pan = chain.pan, "Starting voice");
        output.add_voice(chain, on_ended)
    }
}
