// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Module that provides functions which are convenient for different purposes.
//!
//! In particular, the `warning` and `error` functions must be used for diagnostic output
//! across the `sched-diff` components.

use std::ffi::OsString;
use std::process::Command;

/// Render a Command as a string, to log it and to name it in error messages.
pub fn render_command(cmd: &Command) -> OsString {
    let mut str = OsString::new();

    for (k, v) in cmd.get_envs() {
        if let Some(v) = v {
            str.push(k);
            str.push("=\"");
            str.push(v);
            str.push("\" ");
        }
    }

    str.push(cmd.get_program());

    for a in cmd.get_args() {
        str.push(" ");
        if a.to_string_lossy().contains(' ') {
            str.push("\"");
            str.push(a);
            str.push("\"");
        } else {
            str.push(a);
        }
    }

    str
}

/// Print a warning message. This will add a "warning:" tag before the message and style accordingly.
pub fn warning(msg: &str) {
    let warning = console::style("warning:").bold().yellow();
    let msg_fmt = console::style(msg).bold();
    println!("{warning} {msg_fmt}")
}

/// Print an error message. This will add an "error:" tag before the message and style accordingly.
pub fn error(msg: &str) {
    let error = console::style("error:").bold().red();
    let msg_fmt = console::style(msg).bold();
    eprintln!("{error} {msg_fmt}")
}

/// Print an info message. This will print the stage in bold green and the rest in regular style.
pub fn info_operation(op: &str, msg: &str) {
    let op_fmt = console::style(op).bold().green();
    let msg_fmt = console::style(msg);
    println!("{op_fmt} {msg_fmt}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_render_command() {
        let mut c1 = Command::new("./scheduler");
        c1.args(["-f", "benchmark-cm.txt", "-m", "v"]);
        assert_eq!(render_command(&c1), OsString::from("./scheduler -f benchmark-cm.txt -m v"));
        c1.arg("/c d/");
        assert_eq!(render_command(&c1), OsString::from("./scheduler -f benchmark-cm.txt -m v \"/c d/\""));
        c1.env("PARAM", "VALUE");
        assert_eq!(
            render_command(&c1),
            OsString::from("PARAM=\"VALUE\" ./scheduler -f benchmark-cm.txt -m v \"/c d/\"")
        );
    }
}
