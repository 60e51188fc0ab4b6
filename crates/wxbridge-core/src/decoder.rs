//! The rtl_433 decoder subprocess.
//!
//! The decoder is a long-running external program that demodulates radio
//! transmissions and prints one JSON object per line on stdout. This module
//! owns spawning it, handing its stdout to the read loop, and tearing it
//! down: a termination request, a bounded wait, a force kill on overrun,
//! and capture of whatever it wrote to stderr so abnormal exits can be
//! reported.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use crate::config::DecoderConfig;

/// How the decoder process ended.
#[derive(Debug)]
pub struct DecoderExit {
    /// Exit code, if the process exited normally (`None` when killed by a
    /// signal or when its status could not be collected).
    pub code: Option<i32>,
    /// Everything the decoder wrote to stderr.
    pub stderr: String,
}

impl DecoderExit {
    /// Whether the decoder exited cleanly with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Handle to a running decoder process.
pub struct Decoder {
    child: Child,
}

impl Decoder {
    /// Command line used to invoke the decoder for `config`.
    pub fn command_line(config: &DecoderConfig) -> Vec<String> {
        vec![
            "rtl_433".to_string(),
            "-v".to_string(),
            "-R".to_string(),
            config.decoder_id.clone(),
            "-f".to_string(),
            config.frequency.clone(),
            "-F".to_string(),
            "json".to_string(),
        ]
    }

    /// Launch the decoder with piped stdout and stderr.
    pub fn spawn(config: &DecoderConfig) -> std::io::Result<Self> {
        let argv = Self::command_line(config);
        let mut command = Command::new(&argv[0]);
        command.args(&argv[1..]);
        Self::from_command(command)
    }

    /// Launch an arbitrary command as the decoder. Tests use this to stand
    /// in a shell fake for rtl_433.
    pub fn from_command(mut command: Command) -> std::io::Result<Self> {
        let child = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        Ok(Self { child })
    }

    /// Take the decoder's stdout as a buffered line stream.
    ///
    /// Can only be taken once; the read loop blocks on it until the decoder
    /// closes the pipe.
    pub fn lines(&mut self) -> Option<std::io::Lines<BufReader<ChildStdout>>> {
        self.child
            .stdout
            .take()
            .map(|stdout| BufReader::new(stdout).lines())
    }

    /// Stop the decoder and collect its exit status and stderr.
    ///
    /// Requests termination (SIGTERM on unix), polls for exit for up to
    /// `grace`, and force-kills if the decoder overruns. Already-exited
    /// processes are handled the same way; the termination request is then
    /// a no-op.
    pub fn shutdown(mut self, grace: Duration) -> DecoderExit {
        self.request_termination();

        let deadline = Instant::now() + grace;
        let status = loop {
            match self.child.try_wait() {
                Ok(Some(status)) => break Some(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = self.child.kill();
                        break self.child.wait().ok();
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(_) => break None,
            }
        };

        let mut stderr = String::new();
        if let Some(mut pipe) = self.child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }

        DecoderExit {
            code: status.and_then(|s| s.code()),
            stderr,
        }
    }

    #[cfg(unix)]
    fn request_termination(&mut self) {
        // SIGTERM first so the decoder can release the tuner cleanly.
        unsafe {
            libc::kill(self.child.id() as libc::pid_t, libc::SIGTERM);
        }
    }

    #[cfg(not(unix))]
    fn request_termination(&mut self) {
        let _ = self.child.kill();
    }
}
