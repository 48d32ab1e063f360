//! Header/topology emitters: the `.prv` header line, the `.row` legend, and
//! the static `.pcf` preamble
//!
//! All three are pure functions of the frozen pass-1 topology (the preamble
//! is constant text, reproduced verbatim regardless of trace content).

use std::io::{self, Write};

use chrono::{DateTime, Datelike, Local, Timelike};

use crate::topology::Topology;

/// `.prv` header line, stamped with the current local time
pub fn write_prv_header<W: Write>(out: &mut W, topo: &Topology) -> io::Result<()> {
    write_prv_header_at(out, topo, Local::now())
}

/// `.prv` header line with an explicit stamp (tests inject a fixed one)
pub fn write_prv_header_at<W: Write>(
    out: &mut W,
    topo: &Topology,
    stamp: DateTime<Local>,
) -> io::Result<()> {
    let napps = topo.threads.len();
    write!(
        out,
        "#Paraver ({:02}/{:02}/{} at {:02}:{:02}):{}_ns:1({}):{}",
        stamp.day(),
        stamp.month(),
        stamp.year(),
        stamp.hour(),
        stamp.minute(),
        topo.window.duration_ns(),
        topo.nresources(),
        napps,
    )?;
    // no application list means no separator after the count either
    if napps == 0 {
        writeln!(out)
    } else {
        writeln!(out, ":{}", vec!["1(1:1)"; napps].join(","))
    }
}

/// `.row` resource and application legend
pub fn write_row<W: Write>(out: &mut W, topo: &Topology) -> io::Result<()> {
    writeln!(out, "LEVEL CPU SIZE {}", topo.nresources())?;
    for cpu in 1..=topo.resources.ncpus {
        writeln!(out, "CPU {}", cpu)?;
    }
    for vec in 1..=topo.resources.nsoftirqs {
        writeln!(out, "SOFTIRQ {}", vec)?;
    }
    for (_, entry) in topo.irqs.iter() {
        writeln!(out, "IRQ {} {}", entry.paraver_id, entry.name)?;
    }
    writeln!(out)?;
    writeln!(out)?;

    writeln!(out, "LEVEL APPL SIZE {}", topo.threads.len())?;
    for (_, entry) in topo.threads.iter() {
        writeln!(out, "{}", entry.name)?;
    }
    Ok(())
}

/// Static `.pcf` preamble: display defaults, the seven scheduler states, and
/// the 24-color palette
const PCF_PREAMBLE: &str = concat!(
    "DEFAULT_OPTIONS\n\n",
    "LEVEL\t\t\tTHREAD\n",
    "UNITS\t\t\tNANOSEC\n",
    "LOOK_BACK\t\t100\n",
    "SPEED\t\t\t1\n",
    "FLAG_ICONS\t\tENABLED\n",
    "NUM_OF_STATE_COLORS\t1000\n",
    "YMAX_SCALE\t\t37\n\n\n",
    "DEFAULT_SEMANTIC\n\n",
    "THREAD_FUNC\t\tState As Is\n\n\n",
    "STATES\n",
    "0\t\tIDLE\n",
    "1\t\tWAIT_FOR_CPU\n",
    "2\t\tUSERMODE\n",
    "3\t\tWAIT_BLOCKED\n",
    "4\t\tSYSCALL\n",
    "5\t\tSOFTIRQ\n",
    "6\t\tSOFTIRQ_ACTIVE\n\n\n",
    "STATES_COLOR\n",
    "0\t\t{117,195,255}\n",
    "1\t\t{0,0,255}\n",
    "2\t\t{255,255,255}\n",
    "3\t\t{255,0,0}\n",
    "4\t\t{255,0,174}\n",
    "5\t\t{179,0,0}\n",
    "6\t\t{0,255,0}\n",
    "7\t\t{255,255,0}\n",
    "8\t\t{235,0,0}\n",
    "9\t\t{0,162,0}\n",
    "10\t\t{255,0,255}\n",
    "11\t\t{100,100,177}\n",
    "12\t\t{172,174,41}\n",
    "13\t\t{255,144,26}\n",
    "14\t\t{2,255,177}\n",
    "15\t\t{192,224,0}\n",
    "16\t\t{66,66,66}\n",
    "17\t\t{255,0,96}\n",
    "18\t\t{169,169,169}\n",
    "19\t\t{169,0,0}\n",
    "20\t\t{0,109,255}\n",
    "21\t\t{200,61,68}\n",
    "22\t\t{200,66,0}\n",
    "23\t\t{0,41,0}\n\n\n",
);

/// Static `.pcf` semantic dictionary
pub fn write_pcf_preamble<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(PCF_PREAMBLE.as_bytes())
}
