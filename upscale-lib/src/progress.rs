use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Preparing,
    Extracting,
    Fingerprinting,
    Upscaling,
    Probing,
    Muxing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Stage(Stage),

    /// `done` out of `total` frames have an output image.
    Frame { done: usize, total: usize },
}

/// Receives progress of a run.
pub trait Observer: Sync {
    fn notify(&self, event: Event);
}

impl<F> Observer for F
where
    F: Fn(Event) + Sync,
{
    fn notify(&self, event: Event) {
        self(event)
    }
}

/// Observer that ignores everything.
pub struct Silent;

impl Observer for Silent {
    fn notify(&self, _: Event) {}
}

/// Counts finished frames and reports them in increasing order, even when
/// frames finish on several threads at once.
pub(crate) struct Tally<'a> {
    observer: &'a dyn Observer,
    done: Mutex<usize>,
    total: usize,
}

impl<'a> Tally<'a> {
    pub fn new(observer: &'a dyn Observer, total: usize) -> Self {
        Self {
            observer,
            done: Mutex::new(0),
            total,
        }
    }

    pub fn tick(&self) {
        let mut done = self.done.lock().unwrap_or_else(|err| err.into_inner());

        *done += 1;

        self.observer.notify(Event::Frame {
            done: *done,
            total: self.total,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn tally_is_monotonic_across_threads() {
        let seen = Mutex::new(Vec::new());
        let observer = |event: Event| seen.lock().unwrap().push(event);
        let tally = Tally::new(&observer, 100);

        (0..100).into_par_iter().for_each(|_| tally.tick());

        let seen = seen.into_inner().unwrap();
        let expected: Vec<_> = (1..=100).map(|done| Event::Frame { done, total: 100 }).collect();

        assert_eq!(seen, expected);
    }
}
