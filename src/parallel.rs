// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Row-interval scheduling for per-row numeric passes.
//!
//! A region of `height` rows is split into contiguous, disjoint intervals and
//! an action runs once per interval, on a bounded thread pool when the
//! `parallel` feature is enabled. Every call returns only once all intervals
//! are done.

use std::ops::Range;

use enough::Stop;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::api::ParallelOptions;
use crate::error::Result;
use crate::util::tracing_wrappers::*;

/// A half-open range of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowInterval {
    pub start: usize,
    pub end: usize,
}

impl RowInterval {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

pub struct RowIterator {
    parallelism: usize,
    min_rows_per_task: usize,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for RowIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RowIterator {{ parallelism: {}, min_rows_per_task: {} }}",
            self.parallelism, self.min_rows_per_task
        )
    }
}

impl RowIterator {
    pub fn new(options: &ParallelOptions) -> RowIterator {
        let parallelism = options
            .max_parallelism
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()))
            .max(1);
        #[cfg(feature = "parallel")]
        let pool = if parallelism > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(parallelism)
                .thread_name(|index| format!("jpeg-rows-{index}"))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(err) => {
                    // Thread creation can fail, e.g. on targets without threads.
                    warn!(%err, "could not create thread pool, running sequentially");
                    None
                }
            }
        } else {
            None
        };
        RowIterator {
            parallelism,
            min_rows_per_task: options.min_rows_per_task.max(1),
            #[cfg(feature = "parallel")]
            pool,
        }
    }

    pub fn sequential() -> RowIterator {
        Self::new(&ParallelOptions::sequential())
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Splits `0..height` into at most `parallelism` intervals of at least
    /// `min_rows_per_task` rows each, except when `height` itself is smaller.
    pub fn row_intervals(&self, height: usize) -> Vec<RowInterval> {
        if height == 0 {
            return Vec::new();
        }
        let count = self
            .parallelism
            .min(height / self.min_rows_per_task)
            .max(1);
        let base = height / count;
        let extra = height % count;
        let mut start = 0;
        let intervals: Vec<_> = (0..count)
            .map(|i| {
                let len = base + usize::from(i < extra);
                let interval = RowInterval {
                    start,
                    end: start + len,
                };
                start += len;
                interval
            })
            .collect();
        trace!(height, count, "row intervals");
        intervals
    }

    /// Runs `action` once for each interval of `0..height`.
    pub fn for_each_interval<F>(&self, height: usize, stop: &dyn Stop, action: F) -> Result<()>
    where
        F: Fn(RowInterval) -> Result<()> + Send + Sync,
    {
        self.run(self.row_intervals(height), |interval| {
            stop.check()?;
            action(interval)
        })
    }

    /// Runs `action` once for each interval of `0..height`, handing it the
    /// rows of `data` it covers (`stride` elements per row) and a scratch
    /// buffer of `scratch_len` elements that no other invocation sees.
    pub fn for_each_rows_mut<T, S, F>(
        &self,
        data: &mut [T],
        stride: usize,
        height: usize,
        scratch_len: usize,
        stop: &dyn Stop,
        action: F,
    ) -> Result<()>
    where
        T: Send,
        S: Copy + Default + Send,
        F: Fn(RowInterval, &mut [T], &mut [S]) -> Result<()> + Send + Sync,
    {
        debug_assert!(data.len() >= stride * height);
        let intervals = self.row_intervals(height);
        let mut chunks = Vec::with_capacity(intervals.len());
        let mut rest = data;
        for interval in intervals {
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(interval.len() * stride);
            chunks.push((interval, chunk));
            rest = tail;
        }
        self.run(chunks, |(interval, chunk)| {
            stop.check()?;
            let mut scratch = Vec::new();
            scratch.try_reserve_exact(scratch_len)?;
            scratch.resize(scratch_len, S::default());
            action(interval, chunk, &mut scratch)
        })
    }

    fn run<I, F>(&self, items: Vec<I>, f: F) -> Result<()>
    where
        I: Send,
        F: Fn(I) -> Result<()> + Send + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            if let Some(pool) = &self.pool {
                if items.len() > 1 {
                    return pool.install(|| items.into_par_iter().try_for_each(f));
                }
            }
        }
        items.into_iter().try_for_each(f)
    }
}
