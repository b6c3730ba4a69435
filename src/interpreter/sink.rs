/// Where `print` output goes, one line at a time
pub trait Sink {
    fn write_line(&mut self, line: &str);
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write_line(&mut self, line: &str) {
        (**self).write_line(line)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl Sink for Stdout {
    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Keeps every line in memory
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Buffer {
    lines: Vec<String>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Sink for Buffer {
    fn write_line(&mut self, line: &str) {
        self.lines.push(String::from(line));
    }
}
