/// Skip a test if GCP credentials are not configured.
#[macro_export]
macro_rules! skip_without_gcp {
    () => {
        if std::process::Command::new("gcloud")
            .args(["auth", "print-access-token"])
            .output()
            .map(|o| !o.status.success())
            .unwrap_or(true)
        {
            eprintln!("SKIPPED: gcloud not authenticated");
            return;
        }
        if std::env::var("STRONGBOX_TEST_GCP_KEY").is_err() {
            eprintln!("SKIPPED: STRONGBOX_TEST_GCP_KEY not set (set to a Cloud KMS key name)");
            return;
        }
        if std::env::var("TF_VAR_project_id").is_err() {
            eprintln!("SKIPPED: TF_VAR_project_id not set");
            return;
        }
    };
}
