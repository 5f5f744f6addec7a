use std::path::PathBuf;

#[test]
fn cli_placeholders_writes_image_pairs() {
    let dir = PathBuf::from("target").join("cli_smoke_placeholders");
    let _ = std::fs::remove_dir_all(&dir);

    let exe = std::env::var_os("CARGO_BIN_EXE_quizreel")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "quizreel.exe"
            } else {
                "quizreel"
            });
            p
        });

    let out_arg = dir.to_string_lossy().to_string();
    let status = std::process::Command::new(exe)
        .args(["placeholders", "--count", "2", "--out-dir"])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    for name in [
        "placeholder_q1_A.jpg",
        "placeholder_q1_B.jpg",
        "placeholder_q2_A.jpg",
        "placeholder_q2_B.jpg",
    ] {
        assert!(dir.join(name).exists(), "missing {name}");
    }
}
