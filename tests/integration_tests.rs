use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Output};
use std::str;
use std::thread;

fn mqtt_bench(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mqtt-bench"))
        .args(args)
        .output()
        .expect("Failed to execute mqtt-bench")
}

fn read_packet(stream: &mut TcpStream) -> Option<(u8, Vec<u8>)> {
    let mut first = [0u8; 1];
    stream.read_exact(&mut first).ok()?;

    let mut len = 0usize;
    let mut shift = 0;
    loop {
        let mut byte = [0u8; 1];
        stream.read_exact(&mut byte).ok()?;
        len |= ((byte[0] & 0x7f) as usize) << shift;
        if byte[0] & 0x80 == 0 {
            break;
        }
        shift += 7;
    }

    let mut body = vec![0u8; len];
    stream.read_exact(&mut body).ok()?;
    Some((first[0], body))
}

/// Minimal broker acknowledging QoS 1 publishes on every connection
fn serve_connection(mut stream: TcpStream) {
    if read_packet(&mut stream).is_none() || stream.write_all(&[0x20, 0x02, 0x00, 0x00]).is_err() {
        return;
    }

    while let Some((first, body)) = read_packet(&mut stream) {
        match first >> 4 {
            3 if (first >> 1) & 0x03 == 1 => {
                let topic_len = u16::from_be_bytes([body[0], body[1]]) as usize;
                let id = &body[2 + topic_len..4 + topic_len];
                if stream.write_all(&[0x40, 0x02, id[0], id[1]]).is_err() {
                    return;
                }
            }
            14 => return,
            _ => {}
        }
    }
}

fn spawn_broker() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind fake broker");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || serve_connection(stream));
        }
    });
    port
}

#[test]
fn test_mqtt_bench_e2e_json_output() {
    let port = spawn_broker();
    let broker = format!("tcp://127.0.0.1:{}", port);

    let output = mqtt_bench(&[
        "--broker", &broker, "--topic", "bench/it", "--qos", "1", "--clients", "3", "--count",
        "20", "--size", "64", "--delay", "0", "--msgtimeout", "2000", "--format", "json",
        "--quiet",
    ]);

    let stdout = str::from_utf8(&output.stdout).unwrap_or("");
    let stderr = str::from_utf8(&output.stderr).unwrap_or("");
    assert!(
        output.status.success(),
        "Command failed with status: {:?}\nSTDOUT: {}\nSTDERR: {}",
        output.status.code(),
        stdout,
        stderr
    );

    let report: serde_json::Value = serde_json::from_str(stdout).expect("stdout is not JSON");
    let runs = report["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 3);
    for run in runs {
        assert_eq!(run["successes"], 20);
        assert_eq!(run["failures"], 0);
        assert!(run["msg_time_min"].as_f64().unwrap() <= run["msg_time_max"].as_f64().unwrap());
    }

    let totals = &report["totals"];
    assert_eq!(totals["successes"], 60);
    assert_eq!(totals["total"], 60);
    assert_eq!(totals["ratio"], 1.0);
    assert!(totals["total_msgs_per_sec"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_mqtt_bench_e2e_text_output() {
    let port = spawn_broker();
    let broker = format!("tcp://127.0.0.1:{}", port);

    let output = mqtt_bench(&[
        "--broker", &broker, "--clients", "2", "--count", "5", "--delay", "0", "--msgtimeout",
        "2000",
    ]);

    let stdout = str::from_utf8(&output.stdout).unwrap_or("");
    assert!(output.status.success(), "STDOUT: {}", stdout);
    assert!(stdout.contains("========= TOTAL (2/2) ========="));
    assert!(stdout.contains("Total Ratio:                 1.000 (10/10)"));
    assert!(!stdout.contains("FAILED CLIENT"));
    // logs never leak into the report
    assert!(!stdout.contains("Starting client"));
}

#[test]
fn test_mqtt_bench_unreachable_broker() {
    let output = mqtt_bench(&[
        "--broker",
        "tcp://127.0.0.1:1",
        "--clients",
        "2",
        "--count",
        "3",
        "--delay",
        "0",
        "--format",
        "json",
        "--quiet",
    ]);

    let stdout = str::from_utf8(&output.stdout).unwrap_or("");
    assert!(output.status.success(), "STDOUT: {}", stdout);

    let report: serde_json::Value = serde_json::from_str(stdout).expect("stdout is not JSON");
    assert_eq!(report["runs"].as_array().unwrap().len(), 2);
    assert_eq!(report["totals"]["successes"], 0);
    assert_eq!(report["totals"]["total"], 0);
    assert!(report["totals"]["ratio"].is_null());
    assert!(report["totals"]["msg_time_max"].is_null());
}

#[test]
fn test_mqtt_bench_unreachable_broker_text() {
    let output = mqtt_bench(&[
        "--broker",
        "tcp://127.0.0.1:1",
        "--clients",
        "1",
        "--delay",
        "0",
        "--quiet",
    ]);

    let stdout = str::from_utf8(&output.stdout).unwrap_or("");
    assert!(output.status.success());
    assert!(stdout.contains("======= FAILED CLIENT 0 ======="));
    assert!(stdout.contains("========= TOTAL (0/1) ========="));
    assert!(stdout.contains("Total Ratio:                 NaN (0/0)"));
}

#[test]
fn test_mqtt_bench_rejects_invalid_config() {
    for args in [
        &["--clients", "0"][..],
        &["--qos", "3"][..],
        &["--broker", "http://localhost:1883"][..],
        &["--topic", "bench/#"][..],
        &["--password", "secret"][..],
    ] {
        let output = mqtt_bench(args);
        assert!(
            !output.status.success(),
            "expected {:?} to be rejected",
            args
        );
        assert!(output.stdout.is_empty());
    }
}
