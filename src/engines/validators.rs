// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::FetchError;
use std::net::IpAddr;
use tokio::net::lookup_host;
use url::{Host, Url};

/// 验证 URL 是否安全 (防止 SSRF)
///
/// 目标主机解析出的任一地址为私有、环回、链路本地或组播地址时拒绝，
/// `allowed_hosts` 中的主机名不做检查
pub async fn validate_url(url_str: &str, allowed_hosts: &[String]) -> Result<(), FetchError> {
    let url = Url::parse(url_str).map_err(|e| FetchError::Blocked(e.to_string()))?;

    if let Some(host) = url.host_str() {
        if allowed_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) {
            return Ok(());
        }
    }

    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_ascii_lowercase(),
        Some(Host::Ipv4(ip)) => return check_ip(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => return check_ip(IpAddr::V6(ip)),
        None => return Err(FetchError::Blocked("missing host".to_string())),
    };

    if host == "localhost" || host.ends_with(".localhost") {
        return Err(FetchError::Blocked("localhost is not allowed".to_string()));
    }

    let port = url.port_or_known_default().unwrap_or(443);
    let addrs = lookup_host((host.as_str(), port))
        .await
        .map_err(|e| FetchError::Blocked(format!("cannot resolve {}: {}", host, e)))?;

    for addr in addrs {
        check_ip(addr.ip())?;
    }

    Ok(())
}

fn check_ip(ip: IpAddr) -> Result<(), FetchError> {
    if is_private_ip(ip) {
        Err(FetchError::Blocked(format!(
            "private address is not allowed: {}",
            ip
        )))
    } else {
        Ok(())
    }
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            ipv4.is_private()
                || ipv4.is_loopback()
                || ipv4.is_link_local()
                || ipv4.is_multicast()
                || ipv4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (octets[0] == 100 && (octets[1] & 0xc0) == 64)
        }
        IpAddr::V6(ipv6) => {
            if let Some(mapped) = ipv6.to_ipv4_mapped() {
                return is_private_ip(IpAddr::V4(mapped));
            }
            let first = ipv6.segments()[0];
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                // Unique Local Address (fc00::/7)
                || (first & 0xfe00) == 0xfc00
                // Link-local (fe80::/10)
                || (first & 0xffc0) == 0xfe80
                // Multicast (ff00::/8)
                || (first & 0xff00) == 0xff00
        }
    }
}
