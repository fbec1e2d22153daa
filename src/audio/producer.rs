use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::error::PlaybackError;
use super::stream::SampleStream;
use crate::dsp::{GeneratorState, NoiseGenerator};
use crate::types::events::EngineCommand;

/// Samples generated per producer iteration
pub const CHUNK_SAMPLES: usize = 256;

/// How long the producer waits for commands when the buffer is full
const FULL_WAIT: Duration = Duration::from_millis(2);

/// Longest the controller waits for a command to be acknowledged
const ACK_TIMEOUT: Duration = Duration::from_secs(2);

/// Fill `stream` with up to `count` samples from `generator`
pub fn prefill(generator: &mut dyn NoiseGenerator, stream: &SampleStream, count: usize) -> usize {
    let mut scratch = [0i16; CHUNK_SAMPLES];
    let mut remaining = count.min(stream.free_len());
    let mut written = 0;

    while remaining > 0 {
        let n = remaining.min(CHUNK_SAMPLES);
        generator.fill(&mut scratch[..n]);
        written += stream.push_slice(&scratch[..n]);
        remaining -= n;
    }

    written
}

/// Controller-side handle to the producer thread
pub struct ProducerHandle {
    command_tx: Sender<EngineCommand>,
    ack_rx: Receiver<GeneratorState>,
    thread: Option<JoinHandle<()>>,
}

impl ProducerHandle {
    /// Spawn the producer loop feeding `stream` from `generator`
    pub fn spawn(
        generator: Box<dyn NoiseGenerator>,
        stream: Arc<SampleStream>,
    ) -> Result<Self, PlaybackError> {
        let (command_tx, command_rx) = unbounded();
        let (ack_tx, ack_rx) = bounded(1);

        let producer = Producer {
            generator,
            stream,
            commands: command_rx,
            acks: ack_tx,
            paused: false,
            scratch: vec![0; CHUNK_SAMPLES],
        };

        let thread = thread::Builder::new()
            .name("noise-producer".to_string())
            .spawn(move || producer.run())?;

        Ok(Self {
            command_tx,
            ack_rx,
            thread: Some(thread),
        })
    }

    /// Send a command and wait for the producer to acknowledge it
    pub fn send(&self, command: EngineCommand) -> Result<GeneratorState, PlaybackError> {
        let name = command.name();

        // An ack that arrived after its sender gave up belongs to an older command
        for stale in self.ack_rx.try_iter() {
            log::debug!("Discarding late acknowledgement: {:?}", stale);
        }

        self.command_tx
            .send(command)
            .map_err(|_| PlaybackError::EngineDisconnected)?;

        self.ack_rx.recv_timeout(ACK_TIMEOUT).map_err(|err| {
            log::error!("Producer did not acknowledge {}: {}", name, err);
            PlaybackError::EngineDisconnected
        })
    }

    /// Stop the loop and join the thread
    pub fn shutdown(mut self) -> Result<GeneratorState, PlaybackError> {
        let state = self.send(EngineCommand::Shutdown);
        self.join();
        state
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Noise producer thread panicked");
            }
        }
    }
}

impl Drop for ProducerHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.command_tx.send(EngineCommand::Shutdown);
            self.join();
        }
    }
}

/// Producer loop state, owned by the producer thread
struct Producer {
    generator: Box<dyn NoiseGenerator>,
    stream: Arc<SampleStream>,
    commands: Receiver<EngineCommand>,
    acks: Sender<GeneratorState>,
    paused: bool,
    scratch: Vec<i16>,
}

impl Producer {
    fn run(mut self) {
        log::debug!(
            "Producer started: {} noise, buffer {} samples",
            self.generator.preset(),
            self.stream.capacity()
        );

        loop {
            // Apply everything queued before generating more
            loop {
                match self.commands.try_recv() {
                    Ok(command) => {
                        if !self.apply(command) {
                            return;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            if self.paused {
                match self.commands.recv() {
                    Ok(command) => {
                        if !self.apply(command) {
                            return;
                        }
                    }
                    Err(_) => return,
                }
                continue;
            }

            let free = self.stream.free_len();
            if free == 0 {
                match self.commands.recv_timeout(FULL_WAIT) {
                    Ok(command) => {
                        if !self.apply(command) {
                            return;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => return,
                }
                continue;
            }

            let n = free.min(CHUNK_SAMPLES);
            self.generator.fill(&mut self.scratch[..n]);
            let written = self.stream.push_slice(&self.scratch[..n]);
            if written < n {
                log::debug!("Buffer overrun: dropped {} samples", n - written);
            }
        }
    }

    /// Apply one command; returns false when the loop should exit
    fn apply(&mut self, command: EngineCommand) -> bool {
        log::trace!("Producer applying {:?}", command);

        match command {
            EngineCommand::SwapGenerator(generator) => {
                log::debug!(
                    "Swapping {} generator for {}",
                    self.generator.preset(),
                    generator.preset()
                );
                self.generator = generator;
                self.stream.set_idle(true);
                self.stream.flush();
                self.ack();
                if !self.paused {
                    self.refill();
                }
            }
            EngineCommand::UpdateSettings(settings) => {
                self.generator.set_settings(settings);
                self.ack();
            }
            EngineCommand::Pause => {
                self.paused = true;
                self.stream.set_idle(true);
                self.stream.flush();
                self.ack();
            }
            EngineCommand::Resume => {
                self.paused = false;
                self.ack();
                self.refill();
            }
            EngineCommand::Snapshot => self.ack(),
            EngineCommand::Shutdown => {
                self.ack();
                log::debug!("Producer shutting down");
                return false;
            }
        }

        true
    }

    /// Top the buffer up to half capacity, then leave the idle state
    fn refill(&mut self) {
        let target = self.stream.capacity() / 2;
        prefill(self.generator.as_mut(), &self.stream, target);
        self.stream.set_idle(false);
    }

    fn ack(&self) {
        let _ = self.acks.try_send(self.generator.state());
    }
}
