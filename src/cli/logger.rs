use std::{
    io::{self, IsTerminal, Write},
    sync::{
        mpsc::{self, Sender},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

const FRAME: Duration = Duration::from_millis(300);

type Output = Arc<Mutex<dyn Write + Send>>;

// Reports progress on stderr with an animated ellipsis. Stays silent when
// stderr isn't a terminal so piped output is left clean.
pub struct Logger {
    spinner: Option<Spinner>,
    msg: String,
}

struct Spinner {
    tx: Sender<()>,
    handle: JoinHandle<()>,
    out: Output,
}

impl Logger {
    pub fn start(msg: impl Into<String>) -> Self {
        let msg = msg.into();

        if !io::stderr().is_terminal() {
            return Logger { spinner: None, msg };
        }

        Self::with_output(msg, Arc::new(Mutex::new(io::stderr())))
    }

    fn with_output(msg: String, out: Output) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut ellipses = ["   ", ".  ", ".. ", "..."].into_iter().cycle();
        let line = msg.clone();
        let frames = Arc::clone(&out);

        let handle = thread::spawn(move || loop {
            match rx.try_recv() {
                Ok(_) | Err(mpsc::TryRecvError::Disconnected) => {
                    break;
                }
                Err(mpsc::TryRecvError::Empty) => {
                    if let Ok(mut out) = frames.lock() {
                        let dots = ellipses.next().unwrap_or_default();
                        let _ = write!(out, "\r[repertoire]: {}{} ", line, dots);
                        let _ = out.flush();
                    }
                    thread::sleep(FRAME);
                }
            }
        });

        Logger {
            spinner: Some(Spinner { tx, handle, out }),
            msg,
        }
    }

    // Waits for the last frame before printing the outcome.
    pub fn stop(&mut self, ok: bool) {
        let Some(spinner) = self.spinner.take() else {
            return;
        };

        let _ = spinner.tx.send(());
        let _ = spinner.handle.join();

        let status = if ok { "done!" } else { "failed" };
        if let Ok(mut out) = spinner.out.lock() {
            let _ = writeln!(out, "\r[repertoire]: {}... {}", self.msg, status);
        };
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Some(spinner) = &self.spinner {
            let _ = spinner.tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_comes_last() {
        let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
        let out: Output = buffer.clone();

        let mut logger = Logger::with_output("loading".into(), out);
        thread::sleep(Duration::from_millis(50));
        logger.stop(true);
        thread::sleep(FRAME * 2);

        let written = String::from_utf8(buffer.lock().expect("buffer").clone()).expect("utf-8");
        assert!(
            written.ends_with("\r[repertoire]: loading... done!\n"),
            "no frame may follow the status line: {written:?}"
        );
        assert!(written.starts_with("\r[repertoire]: loading"));
    }

    #[test]
    fn test_silent_logger_stops_quietly() {
        let mut logger = Logger {
            spinner: None,
            msg: "loading".into(),
        };
        logger.stop(false);
        assert!(logger.spinner.is_none());
    }
}
