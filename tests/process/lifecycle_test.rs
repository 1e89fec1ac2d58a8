/*!
 * Process lifecycle tests
 * exec / wait / exit ordering, orphans, load failures and teardown
 */

use crate::common::{eventually, Harness, Recorder};
use pretty_assertions::assert_eq;
use std::thread;
use userprog_kernel::core::KernelConfig;
use userprog_kernel::{ProcessError, ProcessState};

#[test]
fn test_exit_code_survives_until_waited() {
    let h = Harness::new();
    let seen = Recorder::new();
    h.program("quick", |u| Err(u.exit(5)));
    let s = seen.clone();
    h.program("patient", move |u| {
        let pid = u.exec("quick")?;
        let child = pid as u32;
        // Let the child finish before asking for it
        let finished = eventually(|| {
            u.process()
                .children()
                .get(child)
                .is_some_and(|record| record.exit_code().is_some())
        });
        s.push(i32::from(finished));
        s.push(u.wait(pid)?);
        Ok(0)
    });

    assert_eq!(h.run("patient"), 0);
    assert_eq!(seen.values(), vec![1, 5]);
}

#[test]
fn test_implicit_exit_uses_entry_return_value() {
    let h = Harness::new();
    h.program("returns", |_| Ok(12));
    assert_eq!(h.run("returns"), 12);
}

#[test]
fn test_failed_load_returns_error_and_leaves_no_record() {
    let h = Harness::new();
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("loader", move |u| {
        s.push(u.exec("no-such-program arg")?);
        s.push(u.process().children().len() as i32);
        s.push(u.exec("   ")?);
        Ok(0)
    });

    assert_eq!(h.run("loader"), 0);
    assert_eq!(seen.values(), vec![-1, 0, -1]);
    assert!(matches!(
        h.kernel.run_task("no-such-program"),
        Err(ProcessError::LoadFailed { .. })
    ));
}

#[test]
fn test_oversized_arguments_fail_the_load() {
    let h = Harness::new();
    h.program("big", |_| Ok(0));
    // Fits the command-line limit but not the first stack page
    let line = format!("big {}", vec!["y".repeat(64); 60].join(" "));
    assert!(line.len() <= h.kernel.config().max_command_line);
    assert!(matches!(
        h.kernel.run_task(&line),
        Err(ProcessError::LoadFailed { .. })
    ));
}

#[test]
fn test_orphaned_child_exits_cleanly() {
    let h = Harness::new();
    let (release_tx, release_rx) = flume::bounded::<()>(1);
    let finished = Recorder::new();

    let f = finished.clone();
    h.program("orphan", move |u| {
        let _ = release_rx.recv();
        u.print("still alive\n")?;
        f.push(u.pid());
        Err(u.exit(3))
    });
    h.program("neglectful", |u| {
        let pid = u.exec("orphan")?;
        Ok(if pid > 0 { 0 } else { 1 })
    });

    assert_eq!(h.run("neglectful"), 0);
    release_tx.send(()).unwrap();

    assert!(eventually(|| finished.len() == 1));
    assert!(eventually(|| h.kernel.processes().is_empty()));
    assert_eq!(h.output(), "still alive\n");
}

#[test]
fn test_process_table_tracks_waiting_parent() {
    let h = Harness::new();
    let (release_tx, release_rx) = flume::bounded::<()>(1);
    h.program("sleeper", move |_| {
        let _ = release_rx.recv();
        Ok(4)
    });
    h.program("waiter", |u| {
        let pid = u.exec("sleeper")?;
        u.wait(pid)
    });

    let kernel = h.kernel.clone();
    let task = thread::spawn(move || kernel.run_task("waiter"));

    assert!(eventually(|| {
        let table = h.kernel.processes();
        table.len() == 3
            && table
                .iter()
                .any(|p| p.name == "waiter" && p.state == ProcessState::Waiting)
    }));
    let table = h.kernel.processes();
    let waiter = table.iter().find(|p| p.name == "waiter").unwrap();
    let sleeper = table.iter().find(|p| p.name == "sleeper").unwrap();
    assert_eq!(sleeper.parent, Some(waiter.pid));
    assert_eq!(sleeper.state, ProcessState::Running);

    release_tx.send(()).unwrap();
    assert_eq!(task.join().unwrap().unwrap(), 4);
    assert!(h.kernel.processes().is_empty());
}

#[test]
fn test_exit_releases_open_files() {
    let h = Harness::new();
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("hoarder", move |u| {
        u.create("scratch", 100)?;
        let _fd = u.open("scratch")?;
        u.remove("scratch")?;
        s.push(u.kernel().filesystem().exists("scratch"));
        Err(u.exit(0))
    });

    assert_eq!(h.run("hoarder"), 0);
    assert_eq!(seen.values(), vec![false]);
    // The removed inode lived only as long as the descriptor
    assert_eq!(h.fs.used_bytes(), 0);
}

#[test]
fn test_calls_after_exit_report_termination() {
    let h = Harness::new();
    let seen = Recorder::new();
    let s = seen.clone();
    h.program("zombie", move |u| {
        let exited = u.exit(9);
        s.push(u.write(1, b"ghost").map_err(|e| e.code));
        s.push(Err(exited.code));
        Ok(0)
    });

    // The implicit exit after the fact does not override the real one
    assert_eq!(h.run("zombie"), 9);
    assert_eq!(seen.values(), vec![Err(9), Err(9)]);
    assert_eq!(h.output(), "");
}

#[test]
fn test_panicking_program_exits_with_failure() {
    let h = Harness::new();
    h.program("crash", |_| panic!("boom"));
    assert_eq!(h.run("crash"), -1);
    assert_eq!(h.kernel.metrics().fatal_count(), 1);
}

#[test]
fn test_exit_announcements() {
    let h = Harness::with_config(KernelConfig::default());
    h.program("child", |u| Err(u.exit(7)));
    h.program("bad", |u| u.syscall(42, &[]).map(|_| 0));
    h.program("parent", |u| {
        let pid = u.exec("child")?;
        u.wait(pid)?;
        let pid = u.exec("bad")?;
        u.wait(pid)?;
        Ok(0)
    });

    assert_eq!(h.run("parent"), 0);
    assert_eq!(
        h.output(),
        "child: exit(7)\nbad: exit(-1)\nparent: exit(0)\n"
    );
}

#[test]
fn test_halt_powers_off_and_stops_other_processes() {
    let h = Harness::with_config(KernelConfig::default());
    let (release_tx, release_rx) = flume::bounded::<()>(1);
    let seen = Recorder::new();

    let s = seen.clone();
    h.program("bystander", move |u| {
        let _ = release_rx.recv();
        s.push(u.write(1, b"too late").map_err(|e| e.code));
        Ok(0)
    });
    h.program("shutdown", |u| {
        u.exec("bystander")?;
        Err(u.halt())
    });

    assert_eq!(h.run("shutdown"), -1);
    assert!(h.kernel.is_powered_off());
    release_tx.send(()).unwrap();

    assert!(eventually(|| seen.len() == 1));
    assert_eq!(seen.values(), vec![Err(-1)]);
    assert_eq!(h.output(), "");
}
