use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;

const CONFIG_SAMPLE: &str = r#"# For the file locations, If you want it to be relative to the executable directory
# use ${exe_dir}/location
[paths]
posts_dir = "posts"
# database = "blarg.db"

# Remove this table to only log warnings to the console
[log]
level = "Info"
log_to_console = false
location = "log/blarg.log"

[author]
# name = "Your Name"
"#;

pub(crate) fn write_sample_cfg(file_path: &Path) -> io::Result<()> {
    let mut file = File::create(file_path)?;
    file.write_all(CONFIG_SAMPLE.as_bytes())?;
    file.flush()
}
