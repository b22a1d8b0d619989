// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The Java command line the container runs (`spec.md` §4.3 step 7).

/// Build `["java", "-Xms128M", "-Xmx<ram_MiB>M", ...jvm_args,
/// "-Dterminal.jline=false", "-Dterminal.ansi=true", "-jar", jar_name,
/// "nogui"]`.
pub fn java_command(jvm_args: &[String], jar_name: &str, ram_mib: u64) -> Vec<String> {
    let mut cmd = Vec::with_capacity(8 + jvm_args.len());
    cmd.push("java".to_string());
    cmd.push("-Xms128M".to_string());
    cmd.push(format!("-Xmx{ram_mib}M"));
    cmd.extend(jvm_args.iter().cloned());
    cmd.push("-Dterminal.jline=false".to_string());
    cmd.push("-Dterminal.ansi=true".to_string());
    cmd.push("-jar".to_string());
    cmd.push(jar_name.to_string());
    cmd.push("nogui".to_string());
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_expected_command_with_jvm_args() {
        let cmd = java_command(&["-XX:+UseG1GC".to_string()], "paper-1.21.1-deadbeef.jar", 2048);
        assert_eq!(
            cmd,
            vec![
                "java",
                "-Xms128M",
                "-Xmx2048M",
                "-XX:+UseG1GC",
                "-Dterminal.jline=false",
                "-Dterminal.ansi=true",
                "-jar",
                "paper-1.21.1-deadbeef.jar",
                "nogui",
            ]
        );
    }

    #[test]
    fn builds_expected_command_without_jvm_args() {
        let cmd = java_command(&[], "vanilla-1.21.1-ab.jar", 512);
        assert_eq!(
            cmd,
            vec![
                "java",
                "-Xms128M",
                "-Xmx512M",
                "-Dterminal.jline=false",
                "-Dterminal.ansi=true",
                "-jar",
                "vanilla-1.21.1-ab.jar",
                "nogui",
            ]
        );
    }
}
