//! Named redirector options and typed dial requests
//!
//! The native redirector is configured through a single `aio_dial(name, value)`
//! entry point. [`DialOption`] mirrors the native option ordinals, while
//! [`Dial`] pairs every option with a value of the right type so that a
//! request can never carry, say, a port where a boolean toggle is expected.

use std::fmt;

/// Native option identifiers understood by `aio_dial`.
///
/// The discriminants are part of the redirector ABI and must not be reordered.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialOption {
    /// Redirect loopback traffic
    FilterLoopback = 0,
    /// Redirect LAN traffic
    FilterIntranet = 1,
    /// Redirect traffic of the hosting process
    FilterSelf = 2,
    /// Redirect traffic of the parent process
    FilterParent = 3,
    /// Redirect ICMP
    FilterIcmp = 4,
    /// Redirect TCP
    FilterTcp = 5,
    /// Redirect UDP
    FilterUdp = 6,
    /// Intercept DNS queries
    FilterDns = 7,
    /// Artificial ICMP echo delay
    IcmpPing = 8,
    /// Only redirect DNS for matched processes
    DnsOnly = 9,
    /// Send intercepted DNS through the proxy
    DnsProxy = 10,
    /// Upstream DNS host
    DnsHost = 11,
    /// Upstream DNS port
    DnsPort = 12,
    /// Proxy host
    TargetHost = 13,
    /// Proxy port
    TargetPort = 14,
    /// Proxy username
    TargetUser = 15,
    /// Proxy password
    TargetPass = 16,
    /// PID of a local HTTP proxy process
    ProxyPid = 17,
    /// Clear every handle and bypass rule
    ClearNames = 18,
    /// Add a handle rule
    AddName = 19,
    /// Add a bypass rule
    BypassName = 20,
    /// Toggle native logging
    PrintLog = 21,
}

impl DialOption {
    /// Every option in ABI order
    pub const ALL: [DialOption; 22] = [
        Self::FilterLoopback,
        Self::FilterIntranet,
        Self::FilterSelf,
        Self::FilterParent,
        Self::FilterIcmp,
        Self::FilterTcp,
        Self::FilterUdp,
        Self::FilterDns,
        Self::IcmpPing,
        Self::DnsOnly,
        Self::DnsProxy,
        Self::DnsHost,
        Self::DnsPort,
        Self::TargetHost,
        Self::TargetPort,
        Self::TargetUser,
        Self::TargetPass,
        Self::ProxyPid,
        Self::ClearNames,
        Self::AddName,
        Self::BypassName,
        Self::PrintLog,
    ];

    /// Native ordinal passed to `aio_dial`
    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// Short kebab-case name used in logs
    pub fn name(self) -> &'static str {
        match self {
            Self::FilterLoopback => "loopback-filter",
            Self::FilterIntranet => "intranet-filter",
            Self::FilterSelf => "self-filter",
            Self::FilterParent => "parent-filter",
            Self::FilterIcmp => "icmp-filter",
            Self::FilterTcp => "tcp-filter",
            Self::FilterUdp => "udp-filter",
            Self::FilterDns => "dns-filter",
            Self::IcmpPing => "icmp-ping",
            Self::DnsOnly => "dns-only",
            Self::DnsProxy => "dns-proxy",
            Self::DnsHost => "dns-host",
            Self::DnsPort => "dns-port",
            Self::TargetHost => "target-host",
            Self::TargetPort => "target-port",
            Self::TargetUser => "target-user",
            Self::TargetPass => "target-pass",
            Self::ProxyPid => "proxy-pid",
            Self::ClearNames => "clear-names",
            Self::AddName => "add-name",
            Self::BypassName => "bypass-name",
            Self::PrintLog => "print-log",
        }
    }

    /// Whether values for this option must be kept out of logs
    pub fn is_secret(self) -> bool {
        matches!(self, Self::TargetPass)
    }
}

impl fmt::Display for DialOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single typed dial request.
#[derive(Clone, PartialEq, Eq)]
pub enum Dial {
    /// See [`DialOption::FilterLoopback`]
    FilterLoopback(bool),
    /// See [`DialOption::FilterIntranet`]
    FilterIntranet(bool),
    /// See [`DialOption::FilterSelf`]
    FilterSelf(bool),
    /// See [`DialOption::FilterParent`]
    FilterParent(bool),
    /// See [`DialOption::FilterIcmp`]
    FilterIcmp(bool),
    /// See [`DialOption::FilterTcp`]
    FilterTcp(bool),
    /// See [`DialOption::FilterUdp`]
    FilterUdp(bool),
    /// See [`DialOption::FilterDns`]
    FilterDns(bool),
    /// ICMP echo delay in milliseconds
    IcmpPing(u32),
    /// See [`DialOption::DnsOnly`]
    DnsOnly(bool),
    /// See [`DialOption::DnsProxy`]
    DnsProxy(bool),
    /// See [`DialOption::DnsHost`]
    DnsHost(String),
    /// See [`DialOption::DnsPort`]
    DnsPort(u16),
    /// See [`DialOption::TargetHost`]
    TargetHost(String),
    /// See [`DialOption::TargetPort`]
    TargetPort(u16),
    /// See [`DialOption::TargetUser`]
    TargetUser(String),
    /// See [`DialOption::TargetPass`]
    TargetPass(String),
    /// See [`DialOption::ProxyPid`]
    ProxyPid(u32),
    /// Always dialed with an empty value
    ClearNames,
    /// See [`DialOption::AddName`]
    AddName(String),
    /// See [`DialOption::BypassName`]
    BypassName(String),
    /// See [`DialOption::PrintLog`]
    PrintLog(bool),
}

impl Dial {
    /// Option this request targets
    pub fn option(&self) -> DialOption {
        match self {
            Self::FilterLoopback(_) => DialOption::FilterLoopback,
            Self::FilterIntranet(_) => DialOption::FilterIntranet,
            Self::FilterSelf(_) => DialOption::FilterSelf,
            Self::FilterParent(_) => DialOption::FilterParent,
            Self::FilterIcmp(_) => DialOption::FilterIcmp,
            Self::FilterTcp(_) => DialOption::FilterTcp,
            Self::FilterUdp(_) => DialOption::FilterUdp,
            Self::FilterDns(_) => DialOption::FilterDns,
            Self::IcmpPing(_) => DialOption::IcmpPing,
            Self::DnsOnly(_) => DialOption::DnsOnly,
            Self::DnsProxy(_) => DialOption::DnsProxy,
            Self::DnsHost(_) => DialOption::DnsHost,
            Self::DnsPort(_) => DialOption::DnsPort,
            Self::TargetHost(_) => DialOption::TargetHost,
            Self::TargetPort(_) => DialOption::TargetPort,
            Self::TargetUser(_) => DialOption::TargetUser,
            Self::TargetPass(_) => DialOption::TargetPass,
            Self::ProxyPid(_) => DialOption::ProxyPid,
            Self::ClearNames => DialOption::ClearNames,
            Self::AddName(_) => DialOption::AddName,
            Self::BypassName(_) => DialOption::BypassName,
            Self::PrintLog(_) => DialOption::PrintLog,
        }
    }

    /// Wire value handed to the redirector
    pub fn encode(&self) -> String {
        match self {
            Self::FilterLoopback(v)
            | Self::FilterIntranet(v)
            | Self::FilterSelf(v)
            | Self::FilterParent(v)
            | Self::FilterIcmp(v)
            | Self::FilterTcp(v)
            | Self::FilterUdp(v)
            | Self::FilterDns(v)
            | Self::DnsOnly(v)
            | Self::DnsProxy(v)
            | Self::PrintLog(v) => encode_bool(*v).to_string(),
            Self::IcmpPing(v) | Self::ProxyPid(v) => v.to_string(),
            Self::DnsPort(v) | Self::TargetPort(v) => v.to_string(),
            Self::DnsHost(s)
            | Self::TargetHost(s)
            | Self::TargetUser(s)
            | Self::TargetPass(s)
            | Self::AddName(s)
            | Self::BypassName(s) => s.clone(),
            Self::ClearNames => String::new(),
        }
    }
}

impl fmt::Debug for Dial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let option = self.option();
        if option.is_secret() {
            write!(f, "{}(<redacted>)", option)
        } else {
            write!(f, "{}({:?})", option, self.encode())
        }
    }
}

/// Booleans travel as lowercase literals
pub fn encode_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
