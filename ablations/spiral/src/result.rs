//! 实验结果.

use crate::profile::Profile;
use std::io::{self, Write};

/// 将 `p` 的结果写进 `w` 中.
fn describe_into<W: Write>(p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.4}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Spiral directions: {} (+6 axes)", p.directions())?;
    for r in p.records() {
        let s = &r.summary;
        writeln!(w, "{S4}Phantom `{}`:", r.phantom)?;
        writeln!(w, "{S4}{S4}Seeds: {}", s.seeds)?;
        writeln!(w, "{S4}{S4}Combinations: {}", s.combinations)?;
        writeln!(
            w,
            "{S4}{S4}Ellipsoids: {} (fitted {}, searched {})",
            s.ellipsoids, s.fitted, s.candidates
        )?;
        writeln!(
            w,
            "{S4}{S4}Filling: {:.2}% ({} / {})",
            s.filling_percentage(),
            s.assigned_voxels,
            s.foreground_voxels
        )?;
        writeln!(w, "{S4}{S4}Mean EF: {}", f64_to_display(r.mean_ef))?;
        writeln!(w, "{S4}{S4}Time: {} ms", r.elapsed.as_millis())?;
    }
    writeln!(w, "{S4}Total time: {} ms", p.total_ms())?;
    let slowest = p.slowest().map(|r| r.phantom).unwrap_or("/");
    write!(w, "{S4}Most time-consuming phantom: {slowest}")?;
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<Profile>,
}

impl AblationResult {
    pub fn from_iter<I: IntoIterator<Item = Profile>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 分析运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(1024);

        for profile in self.data.iter() {
            describe_into(profile, &mut buf).expect("Writing to memory buffer");
            println!("{}", String::from_utf8_lossy(&buf));
            buf.clear();

            utils::sep();
        }
    }
}
