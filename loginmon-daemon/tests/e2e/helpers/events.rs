//! Log lines and runtime events used across scenarios.

use loginmon_core::event::RawRuntimeEvent;

pub const SSH_LOGIN_ALICE: &str = "Jan  1 00:00:01 web-01 sshd[4242]: pam_unix(sshd:session): session opened for user alice by (uid=0)";
pub const SSH_LOGOUT_BOB: &str =
    "Jan  1 00:10:00 web-01 sshd[4300]: pam_unix(sshd:session): session closed for user bob";
pub const CRON_NOISE: &str =
    "Jan  1 00:05:00 web-01 CRON[5000]: (root) CMD (run-parts /etc/cron.hourly)";

/// A container event with compose service, name and image attributes.
pub fn container_event(action: &str, name: &str, image: &str, service: &str) -> RawRuntimeEvent {
    RawRuntimeEvent::new("container", action)
        .with_attribute("name", name)
        .with_attribute("image", image)
        .with_attribute("com.docker.compose.service", service)
}

#[allow(dead_code)]
pub fn network_event(action: &str) -> RawRuntimeEvent {
    RawRuntimeEvent::new("network", action).with_attribute("name", "bridge")
}
