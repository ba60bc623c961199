//! Diagnostic dump.
//!
//! Buckets are read one at a time; the output is not an atomic snapshot of
//! the whole allocator. Member features are read after the bucket lock has
//! been released.

use alloc::string::String;
use core::fmt::Write;

use crate::allocator::AttentionAllocator;
use crate::clock::TickSource;
use crate::feature::DUMP_FEATURE_PREFIX;

impl<C: TickSource> AttentionAllocator<C> {
    /// Human-readable state of every non-empty bucket
    pub fn dump(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_dump(&mut out);
        out
    }

    /// Emit [`dump`](Self::dump) through the logger, one line per record
    pub fn dump_to_log(&self) {
        for line in self.dump().lines() {
            log::info!("{}", line);
        }
    }

    fn write_dump(&self, out: &mut String) -> core::fmt::Result {
        if !self.is_initialized() {
            return writeln!(out, "Cognitive scheduler not initialized");
        }

        writeln!(out, "Cognitive Scheduler State:")?;
        writeln!(
            out,
            "Total attention: {}, Emergency mode: {}",
            self.attention_budget(),
            u8::from(self.emergency_mode())
        )?;
        writeln!(
            out,
            "Active processes in tensor: {}",
            self.tensor().map_or(0, |t| t.active_count())
        )?;

        for queue in self.queues() {
            let members = queue.members();
            if members.is_empty() {
                continue;
            }

            writeln!(
                out,
                "Attention queue {} (threshold {:.2}): {} processes",
                queue.level(),
                queue.threshold(),
                members.len()
            )?;

            for proc in &members {
                let v = proc.snapshot();
                write!(
                    out,
                    "  Process {}: attention={:.2} features=[",
                    proc.pid(),
                    v.attention_level()
                )?;
                for (i, f) in v.features()[..DUMP_FEATURE_PREFIX].iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write!(out, "{:.2}", f)?;
                }
                writeln!(out, "]")?;
            }
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use crate::clock::ManualClock;
    use crate::config::CogConfig;
    use crate::feature::Feature;
    use crate::process::CogProc;
    use crate::AttentionAllocator;

    #[test]
    fn test_dump_uninitialized() {
        let a = AttentionAllocator::new(CogConfig::default(), ManualClock::new(100)).unwrap();
        assert_eq!(a.dump(), "Cognitive scheduler not initialized\n");
    }

    #[test]
    fn test_dump_lists_non_empty_buckets() {
        let a = AttentionAllocator::with_clock(ManualClock::new(100));
        let p = Arc::new(CogProc::cognitive(42));
        a.set_feature(&p, Feature::Load.index(), 0.3);
        a.set_feature(&p, Feature::Interactive.index(), 0.8);
        a.set_feature(&p, Feature::Emergent.index(), 0.6);
        a.ready(&p);

        let dump = a.dump();
        let expected = "\
Cognitive Scheduler State:
Total attention: 1000, Emergency mode: 0
Active processes in tensor: 1
Attention queue 3 (threshold 0.25): 1 processes
  Process 42: attention=0.35 features=[0.30,0.00,0.00,0.80]
";
        assert_eq!(dump, expected);
    }

    #[test]
    fn test_dump_is_read_only() {
        let a = AttentionAllocator::with_clock(ManualClock::new(100));
        let p = Arc::new(CogProc::cognitive(1));
        a.ready(&p);

        let before = a.stats();
        let _ = a.dump();
        assert_eq!(a.stats(), before);
        assert_eq!(p.bucket(), Some(3));
    }
}
