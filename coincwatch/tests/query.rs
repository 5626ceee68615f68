use coincwatch::source::{QuerySource, SampleSource};
use std::cell::RefCell;
use std::io::{Cursor, Read, Write};
use std::rc::Rc;

/// Serial port stand-in: canned responses out, commands recorded
struct StubPort {
    responses: Cursor<Vec<u8>>,
    commands: Rc<RefCell<Vec<u8>>>,
}

impl StubPort {
    fn new(responses: &str) -> (Self, Rc<RefCell<Vec<u8>>>) {
        let commands = Rc::new(RefCell::new(Vec::new()));
        let port = StubPort {
            responses: Cursor::new(responses.as_bytes().to_vec()),
            commands: commands.clone(),
        };
        return (port, commands);
    }
}

impl Read for StubPort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.responses.read(buf)
    }
}

impl Write for StubPort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.commands.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn polls_with_c_and_parses_nine_fields() {
    let (port, commands) = StubPort::new(
        "57000 27000 27000 100 3000 3000 10 60 5\n\
         57100 27100 27100 101 3010 3010 11 61 6\n",
    );
    let mut source = QuerySource::new(port);

    let s1 = source.sample().unwrap().expect("first readout");
    assert_eq!(s1.singles, [57000, 27000, 27000, 100]);
    assert_eq!(s1.coinc, [3000, 3000, 10, 60]);
    assert_eq!(s1.err, 5);
    assert_eq!(commands.borrow().as_slice(), b"c\n");

    let s2 = source.sample().unwrap().expect("second readout");
    assert_eq!(s2.singles[0], 57100);
    assert_eq!(s2.err, 6);
    assert_eq!(commands.borrow().as_slice(), b"c\nc\n");

    // Device gone: polls return no sample
    assert!(source.sample().unwrap().is_none());
}

#[test]
fn short_response_is_rejected() {
    let (port, _) = StubPort::new("1 2 3\n");
    let mut source = QuerySource::new(port);
    let err = source.sample().unwrap_err();
    assert!(err.to_string().contains("expected 9 count fields, got 3"));
}

#[test]
fn long_response_is_rejected() {
    let (port, _) = StubPort::new("1 2 3 4 5 6 7 8 9 10\n");
    let mut source = QuerySource::new(port);
    let err = source.sample().unwrap_err();
    assert!(err.to_string().contains("expected 9 count fields, got 10"));
}

#[test]
fn garbage_token_is_rejected() {
    let (port, _) = StubPort::new("1 2 3 4 x 6 7 8 9\n");
    let mut source = QuerySource::new(port);
    let err = source.sample().unwrap_err();
    assert!(err.to_string().contains("bad count field"));
}
