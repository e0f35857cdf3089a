use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn supashift() -> Command {
    let mut cmd = Command::cargo_bin("supashift").unwrap();
    // Keep host configuration out of the tests
    for var in [
        "CLOUDSQL_HOST",
        "CLOUDSQL_PORT",
        "CLOUDSQL_USER",
        "CLOUDSQL_DB",
        "CLOUDSQL_PASSWORD",
        "CLOUDSQL_SCHEMA",
        "SUPABASE_HOST",
        "SUPABASE_PORT",
        "SUPABASE_USER",
        "SUPABASE_DB",
        "SUPABASE_PASSWORD",
        "SUPABASE_SCHEMA",
        "SUPASHIFT_OUTPUT_DIR",
        "SUPASHIFT_CONFIG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn clean_dump_missing_input_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cleaned.sql");

    supashift()
        .current_dir(dir.path())
        .args(["clean-dump", "--input-file", "missing.sql"])
        .args(["--source-schema", "app", "--target-schema", "public"])
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot access"));

    assert!(!output.exists());
}

#[test]
fn clean_dump_renames_schema_and_strips_ownership() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.sql");
    let output = dir.path().join("cleaned.sql");
    fs::write(
        &input,
        "CREATE SCHEMA app;\nCREATE TABLE app.users(id int);\nALTER TABLE app.users OWNER TO clouduser;\n",
    )
    .unwrap();

    supashift()
        .current_dir(dir.path())
        .arg("clean-dump")
        .arg("--input-file")
        .arg(&input)
        .args(["--source-schema", "app", "--target-schema", "public"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let cleaned = fs::read_to_string(&output).unwrap();
    assert_eq!(
        cleaned,
        "CREATE SCHEMA public;\nCREATE TABLE public.users(id int);\n"
    );
}

#[test]
fn clean_dump_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.sql");
    let once = dir.path().join("once.sql");
    let twice = dir.path().join("twice.sql");
    fs::write(
        &input,
        "CREATE SCHEMA app;\nGRANT ALL ON SCHEMA app TO cloudsqlsuperuser;\nCREATE TABLE app.t(id int);\n",
    )
    .unwrap();

    for (i, o) in [(&input, &once), (&once, &twice)] {
        supashift()
            .current_dir(dir.path())
            .arg("clean-dump")
            .arg("--input-file")
            .arg(i)
            .args(["--source-schema", "app", "--target-schema", "public"])
            .arg("--output")
            .arg(o)
            .assert()
            .success();
    }

    assert_eq!(
        fs::read_to_string(&once).unwrap(),
        fs::read_to_string(&twice).unwrap()
    );
}

#[test]
fn validate_reports_missing_configuration() {
    let dir = tempfile::tempdir().unwrap();

    supashift()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"))
        .stderr(predicate::str::contains("CLOUDSQL_HOST"));
}

#[cfg(unix)]
#[test]
fn migrate_aborts_chain_when_export_fails() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let bin_dir = dir.path().join("bin");
    fs::create_dir_all(&bin_dir).unwrap();

    // Fake pg_dump: answers --version, fails everything else.
    let fake = bin_dir.join("pg_dump");
    fs::write(
        &fake,
        "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then\n  echo 'pg_dump (PostgreSQL) 16.0'\n  exit 0\nfi\necho 'connection refused' >&2\nexit 1\n",
    )
    .unwrap();
    fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).unwrap();

    let path = format!(
        "{}:{}",
        bin_dir.display(),
        std::env::var("PATH").unwrap_or_default()
    );

    let out_dir = dir.path().join("dumps");

    supashift()
        .current_dir(dir.path())
        .env("PATH", path)
        .env("CLOUDSQL_HOST", "127.0.0.1")
        .env("CLOUDSQL_USER", "exporter")
        .env("CLOUDSQL_DB", "appdb")
        .env("CLOUDSQL_PASSWORD", "x")
        .env("SUPABASE_HOST", "127.0.0.1")
        .env("SUPABASE_USER", "postgres")
        .env("SUPABASE_PASSWORD", "x")
        .env("SUPASHIFT_OUTPUT_DIR", &out_dir)
        .args(["migrate", "-y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("export stage failed"));

    // The cleaner and importer never ran
    assert!(!out_dir.join("cleaned_backup.sql").exists());
}
