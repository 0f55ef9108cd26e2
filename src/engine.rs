use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, error, trace, warn};
use std::{
    io::{BufRead, BufReader, Error, ErrorKind, Read, Result, Write},
    process::{Child, ChildStdin, Command, Stdio},
    thread,
    time::Duration,
};
use wait_timeout::ChildExt;

/// How long a bot gets to exit on its own after `exit` before it is killed.
const EXIT_GRACE: Duration = Duration::from_millis(500);

/// Line transport to a bot. Implemented by [`Engine`] for real processes.
pub trait BotIo {
    fn write_line(&mut self, line: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    /// Reads one line. A `timeout` that expires yields `ErrorKind::TimedOut`.
    fn read_line(&mut self, timeout: Option<Duration>) -> Result<String>;

    fn write_lines(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            self.write_line(line)?;
        }
        self.flush()
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct EngineBuilder {
    pub cmd: String,
    pub name: String,
    pub verbose: bool,
    pub capture_diagnostics: bool,
}

impl EngineBuilder {
    pub fn init(&self) -> Result<Engine> {
        let stderr = if self.capture_diagnostics {
            Stdio::piped()
        } else if self.verbose {
            Stdio::inherit()
        } else {
            Stdio::null()
        };

        let mut child = Command::new(&self.cmd)
            .stdout(Stdio::piped())
            .stdin(Stdio::piped())
            .stderr(stderr)
            .spawn()?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(Error::new(ErrorKind::BrokenPipe, "bot pipes unavailable"));
        };

        let lines = spawn_line_reader(stdout);
        let diagnostics = child.stderr.take().map(spawn_line_reader);

        debug!("spawned {} (cmd={}, pid={})", self.name, self.cmd, child.id());

        Ok(Engine {
            child,
            stdin,
            lines,
            diagnostics,
            name: self.name.clone(),
            verbose: self.verbose,
            exited: false,
        })
    }
}

/// Forwards every line of `stream` to the returned channel. The channel
/// disconnects once the stream reaches end of file.
fn spawn_line_reader<R: Read + Send + 'static>(stream: R) -> Receiver<Result<String>> {
    let (send, recv) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if send.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = send.send(Err(e));
                    break;
                }
            }
        }
    });
    recv
}

#[derive(Debug)]
pub struct Engine {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<Result<String>>,
    diagnostics: Option<Receiver<Result<String>>>,
    name: String,
    verbose: bool,
    exited: bool,
}

impl Engine {
    /// Sends `exit` and reaps the process, killing it if it lingers.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.exited {
            return;
        }
        self.exited = true;

        if let Err(e) = self.write_line("exit").and_then(|_| self.flush()) {
            debug!("{} did not take exit: {e}", self.name);
        }

        match self.child.wait_timeout(EXIT_GRACE) {
            Ok(Some(status)) => debug!("{} exited with {status}", self.name),
            Ok(None) => {
                warn!("{} ignored exit, killing it", self.name);
                let _ = self.child.kill();
                let _ = self.child.wait();
            }
            Err(e) => error!("{} could not be reaped: {e}", self.name),
        }
    }

    /// Everything the bot wrote to its diagnostic stream. Only meaningful
    /// after [`Engine::shutdown`], and only when diagnostics were captured.
    pub fn diagnostics(&mut self) -> Vec<String> {
        let Some(recv) = &self.diagnostics else {
            return vec![];
        };
        let mut lines = vec![];
        while let Ok(Ok(line)) = recv.recv_timeout(EXIT_GRACE) {
            lines.push(line.trim_end().to_string());
        }
        lines
    }
}

impl BotIo for Engine {
    fn write_line(&mut self, line: &str) -> Result<()> {
        trace!("{} < {line}", self.name);
        if self.verbose {
            println!("{line}");
        }
        writeln!(self.stdin, "{line}")
    }

    fn flush(&mut self) -> Result<()> {
        self.stdin.flush()
    }

    fn read_line(&mut self, timeout: Option<Duration>) -> Result<String> {
        let disconnected = || {
            error!("{} (pid={}) disconnected", self.name, self.child.id());
            Error::new(ErrorKind::UnexpectedEof, "Read 0 bytes")
        };
        let received = match timeout {
            Some(timeout) => match self.lines.recv_timeout(timeout) {
                Ok(received) => received,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(Error::new(ErrorKind::TimedOut, "no reply in time"));
                }
                Err(RecvTimeoutError::Disconnected) => return Err(disconnected()),
            },
            None => self.lines.recv().map_err(|_| disconnected())?,
        };
        let line = received?;
        trace!("{} > {}", self.name, line.trim());
        if self.verbose {
            println!("{}", line.trim_end());
        }
        Ok(line)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}


/// Shell bot that appends every line it receives to a log file and answers
/// `action` with `no_moves`.
#[cfg(all(test, unix))]
pub mod recording {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use std::process;

    #[derive(Debug)]
    pub struct RecordingBot {
        dir: PathBuf,
        pub script: String,
        log: PathBuf,
    }

    impl RecordingBot {
        pub fn new(tag: &str) -> RecordingBot {
            let dir = std::env::temp_dir().join(format!("uttt-referee-{}-{tag}", process::id()));
            fs::create_dir_all(&dir).unwrap();
            let log = dir.join("received.log");
            let _ = fs::remove_file(&log);
            let script = dir.join("bot.sh");
            fs::write(
                &script,
                format!(
                    "#!/bin/sh\n\
                     while read line; do\n\
                     \techo \"$line\" >> '{}'\n\
                     \tcase \"$line\" in\n\
                     \t\taction*) echo no_moves ;;\n\
                     \t\texit) exit 0 ;;\n\
                     \tesac\n\
                     done\n",
                    log.display()
                ),
            )
            .unwrap();
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
            RecordingBot {
                script: script.to_string_lossy().into_owned(),
                dir,
                log,
            }
        }

        /// Lines received so far, in order.
        pub fn received(&self) -> Vec<String> {
            fs::read_to_string(&self.log)
                .unwrap_or_default()
                .lines()
                .map(String::from)
                .collect()
        }
    }

    impl Drop for RecordingBot {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn builder(cmd: &str) -> EngineBuilder {
        EngineBuilder {
            cmd: cmd.to_string(),
            name: cmd.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn missing_binary_fails_to_spawn() {
        assert!(builder("/nonexistent/uttt-bot").init().is_err());
    }

    #[test]
    fn lines_round_trip_through_cat() {
        let mut engine = builder("cat").init().unwrap();
        engine
            .write_lines(&[String::from("update game round 1"), String::from("no_moves")])
            .unwrap();
        assert_eq!(engine.read_line(None).unwrap(), "update game round 1\n");
        assert_eq!(engine.read_line(Some(Duration::from_secs(5))).unwrap(), "no_moves\n");
        engine.shutdown();
        engine.shutdown();
    }

    #[test]
    fn silent_bot_times_out() {
        let mut engine = builder("cat").init().unwrap();
        let err = engine.read_line(Some(Duration::from_millis(50))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
    }

    #[test]
    fn exiting_bot_reads_as_eof() {
        let mut engine = builder("true").init().unwrap();
        let err = engine.read_line(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn dropping_an_engine_sends_exit() {
        let bot = recording::RecordingBot::new("drop");
        let mut engine = builder(&bot.script).init().unwrap();
        engine.write_lines(&[String::from("update game round 1")]).unwrap();
        drop(engine);
        assert_eq!(bot.received(), ["update game round 1", "exit"]);
    }

    #[test]
    fn diagnostics_are_empty_unless_captured() {
        let mut engine = builder("true").init().unwrap();
        engine.shutdown();
        assert!(engine.diagnostics().is_empty());
    }
}
