//! Integration tests for pip-layers

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn pip_layers() -> Command {
        cargo_bin_cmd!("pip-layers")
    }

    #[test]
    fn help_displays() {
        pip_layers()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Python packages buildpack"));
    }

    #[test]
    fn version_displays() {
        pip_layers()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("pip-layers"));
    }

    #[test]
    fn build_help_lists_arguments() {
        pip_layers()
            .args(["build", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("LAYERS"))
            .stdout(predicate::str::contains("PLAN"));
    }

    #[test]
    fn missing_subcommand_fails() {
        pip_layers().assert().failure();
    }
}

mod detect_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn detect(app: &TempDir, plan: &std::path::Path) -> Command {
        let mut cmd = cargo_bin_cmd!("pip-layers");
        cmd.arg("--app-dir")
            .arg(app.path())
            .arg("detect")
            .arg(app.path())
            .arg(plan);
        cmd
    }

    #[test]
    fn plan_provides_requirements_when_present() {
        let app = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        std::fs::write(app.path().join("requirements.txt"), "flask\n").unwrap();
        let plan = out.path().join("plan.toml");

        detect(&app, &plan).assert().code(0);

        let content = std::fs::read_to_string(&plan).unwrap();
        let parsed: toml::Value = toml::from_str(&content).unwrap();
        let provides: Vec<&str> = parsed["provides"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(provides, vec!["python-packages", "requirements"]);
        assert_eq!(parsed["requires"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn plan_without_requirements_still_passes() {
        let app = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let plan = out.path().join("plan.toml");

        detect(&app, &plan).assert().code(0);

        let content = std::fs::read_to_string(&plan).unwrap();
        let parsed: toml::Value = toml::from_str(&content).unwrap();
        assert_eq!(parsed["provides"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn json_flag_prints_plan() {
        let app = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        std::fs::write(app.path().join("requirements.txt"), "").unwrap();
        let plan = out.path().join("plan.toml");

        detect(&app, &plan)
            .arg("--json")
            .assert()
            .code(0)
            .stdout(predicate::str::contains("\"requires\""))
            .stdout(predicate::str::contains("python-packages"));
    }

    #[test]
    fn unwritable_plan_is_detect_error() {
        let app = TempDir::new().unwrap();
        let plan = app.path().join("missing-dir").join("plan.toml");

        detect(&app, &plan)
            .assert()
            .code(101)
            .stderr(predicate::str::contains("Error:"));
    }
}

mod build_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const SELECTED: &str = r#"
[[entries]]
name = "python-packages"
[entries.metadata]
launch = true

[[entries]]
name = "python-packages"
[entries.metadata]
build = true
"#;

    struct Build {
        app: TempDir,
        layers: TempDir,
        work: TempDir,
        plan: PathBuf,
    }

    impl Build {
        fn new(plan: &str) -> Self {
            let app = TempDir::new().unwrap();
            let layers = TempDir::new().unwrap();
            let work = TempDir::new().unwrap();
            let plan_path = work.path().join("plan.toml");
            std::fs::write(&plan_path, plan).unwrap();
            Self {
                app,
                layers,
                work,
                plan: plan_path,
            }
        }

        fn app(&self) -> &Path {
            self.app.path()
        }

        fn layers(&self) -> &Path {
            self.layers.path()
        }

        fn command(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("pip-layers");
            cmd.env_remove("PIP_LAYERS_CONFIG")
                .arg("--app-dir")
                .arg(self.app())
                .arg("build")
                .arg(self.layers())
                .arg(self.app())
                .arg(&self.plan);
            cmd
        }

        /// Point the build at a shell script standing in for python
        #[cfg(unix)]
        fn fake_python(&self, body: &str) {
            use std::os::unix::fs::PermissionsExt;

            let script = self.work.path().join("fake-python");
            std::fs::write(&script, format!("#!/bin/sh\n{}", body)).unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
            std::fs::write(
                self.app().join(".pip-layers.toml"),
                format!("[pip]\npython = \"{}\"\n", script.display()),
            )
            .unwrap();
        }
    }

    /// Creates `$PYTHONUSERBASE/lib` and the pip cache directory, like pip would
    #[cfg(unix)]
    const INSTALLING_PIP: &str = r#"
mkdir -p "$PYTHONUSERBASE/lib"
for arg in "$@"; do
  case "$arg" in
    --cache-dir=*) mkdir -p "${arg#--cache-dir=}" ;;
  esac
done
echo "Successfully installed flask"
"#;

    #[test]
    fn not_selected_is_a_no_op() {
        let build = Build::new("[[entries]]\nname = \"python\"\n");

        build.command().assert().code(0);

        assert!(!build.layers().join("python-packages.toml").exists());
    }

    #[test]
    fn selected_without_manifest_fails_construction() {
        let build = Build::new(SELECTED);

        build
            .command()
            .assert()
            .code(102)
            .stderr(predicate::str::contains("requirements.txt"));
    }

    #[test]
    fn app_root_defaults_to_working_directory() {
        let build = Build::new(SELECTED);
        std::fs::write(build.app().join("requirements.txt"), "flask\n").unwrap();

        // Without --app-dir the manifest lookup happens in the working directory
        let mut cmd = cargo_bin_cmd!("pip-layers");
        cmd.env_remove("PIP_LAYERS_CONFIG")
            .current_dir(build.layers())
            .arg("build")
            .arg(build.layers())
            .arg(build.app())
            .arg(&build.plan)
            .assert()
            .code(102)
            .stderr(predicate::str::contains("requirements.txt"));
    }

    #[test]
    fn invalid_plan_is_no_build_context() {
        let build = Build::new("[[entries]\nname = ");

        build.command().assert().code(100);
    }

    #[cfg(unix)]
    #[test]
    fn build_contributes_layers_and_web_process() {
        let build = Build::new(SELECTED);
        std::fs::write(build.app().join("requirements.txt"), "flask\n").unwrap();
        std::fs::write(
            build.app().join("Procfile"),
            "worker: celery\nweb: gunicorn app:app\n",
        )
        .unwrap();
        build.fake_python(INSTALLING_PIP);

        build
            .command()
            .assert()
            .code(0)
            .stdout(predicate::str::contains("Python Packages"))
            .stdout(predicate::str::contains("Successfully installed flask"))
            .stdout(predicate::str::contains("PIP Cache"));

        let layer_toml: toml::Value = toml::from_str(
            &std::fs::read_to_string(build.layers().join("python-packages.toml")).unwrap(),
        )
        .unwrap();
        assert_eq!(layer_toml["build"].as_bool(), Some(true));
        assert_eq!(layer_toml["launch"].as_bool(), Some(true));
        assert_eq!(layer_toml["cache"].as_bool(), Some(false));
        assert_eq!(
            layer_toml["metadata"]["name"].as_str(),
            Some("python-packages")
        );
        assert_eq!(layer_toml["metadata"]["hash"].as_str().unwrap().len(), 64);

        let prepend = std::fs::read_to_string(
            build
                .layers()
                .join("python-packages/env/PYTHONUSERBASE.prepend"),
        )
        .unwrap();
        assert_eq!(
            prepend,
            build.layers().join("python-packages").to_string_lossy()
        );

        let cache_toml: toml::Value = toml::from_str(
            &std::fs::read_to_string(build.layers().join("pip-cache.toml")).unwrap(),
        )
        .unwrap();
        assert_eq!(cache_toml["cache"].as_bool(), Some(true));
        assert_eq!(cache_toml["launch"].as_bool(), Some(false));

        let launch = std::fs::read_to_string(build.layers().join("launch.toml")).unwrap();
        assert!(launch.contains("type = \"web\""));
        assert!(launch.contains("command = \"gunicorn app:app\""));
    }

    #[cfg(unix)]
    #[test]
    fn installer_failure_is_contribute_failure() {
        let build = Build::new(SELECTED);
        std::fs::write(build.app().join("requirements.txt"), "nope\n").unwrap();
        build.fake_python("echo 'ERROR: No matching distribution found for nope' >&2\nexit 1\n");

        build
            .command()
            .assert()
            .code(103)
            .stderr(predicate::str::contains("No matching distribution"));

        assert!(!build.layers().join("python-packages.toml").exists());
    }

    #[cfg(unix)]
    #[test]
    fn identity_none_omits_metadata() {
        let build = Build::new(SELECTED);
        std::fs::write(build.app().join("requirements.txt"), "flask\n").unwrap();
        build.fake_python(INSTALLING_PIP);
        let config = build.app().join(".pip-layers.toml");
        let mut content = std::fs::read_to_string(&config).unwrap();
        content.push_str("\n[layers]\nidentity = \"none\"\n");
        std::fs::write(&config, content).unwrap();

        build.command().assert().code(0);

        let layer_toml: toml::Value = toml::from_str(
            &std::fs::read_to_string(build.layers().join("python-packages.toml")).unwrap(),
        )
        .unwrap();
        assert!(layer_toml.get("metadata").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn stale_layer_metadata_is_removed() {
        let build = Build::new(SELECTED);
        std::fs::write(build.app().join("requirements.txt"), "flask\n").unwrap();
        build.fake_python(INSTALLING_PIP);
        std::fs::create_dir(build.layers().join("old-layer")).unwrap();
        std::fs::write(build.layers().join("old-layer.toml"), "cache = true\n").unwrap();

        build.command().assert().code(0);

        assert!(!build.layers().join("old-layer.toml").exists());
        assert!(build.layers().join("python-packages.toml").exists());
        assert!(build.layers().join("pip-cache.toml").exists());
    }
}
