//! Resource URL tables per region.
//!
//! The dispatch response carries three CDN URL lists (asset bundles,
//! extra resources, audio/video). The tables mirror the official CDNs
//! per region channel; with the local cache enabled every list instead
//! points at this server's `/statics/` tree.

/// Region channels with distinct CDN tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Overseas,
    MainlandBeta,
    Mainland,
    Global,
    Japan,
    Korea,
}

/// Picks the CDN channel from a full version string. The tag must sit
/// between other tokens (`<prefix>_<region>_<rest>`); a bare or
/// edge-positioned tag is not a full version string. Returns `None`
/// when no tag matches, in which case all URL lists stay empty.
fn channel_of(version_key: &str) -> Option<(Channel, &str)> {
    let tokens: Vec<&str> = version_key.split('_').collect();
    for (i, token) in tokens.iter().enumerate() {
        if i == 0 || i + 1 == tokens.len() {
            continue;
        }
        let channel = match *token {
            "os" => Channel::Overseas,
            "gf" if version_key.contains("beta") => Channel::MainlandBeta,
            "gf" => Channel::Mainland,
            "global" => Channel::Global,
            "jp" => Channel::Japan,
            "kr" => Channel::Korea,
            _ => continue,
        };
        return Some((channel, *token));
    }
    None
}

fn local_url_list(tag: &str, version_key: &str, public_url: &str) -> Vec<String> {
    let formatted = version_key.replace('.', "_");
    let base = format!("{public_url}/statics/{tag}/{formatted}");
    vec![base.clone(), base]
}

pub fn asset_bundle_url_list(
    version_key: &str,
    use_local_cache: bool,
    public_url: &str,
) -> Vec<String> {
    let Some((channel, tag)) = channel_of(version_key) else {
        return Vec::new();
    };
    if use_local_cache {
        return local_url_list(tag, version_key, public_url);
    }
    let urls: &[&str] = match channel {
        Channel::MainlandBeta => &[
            "https://autopatchbeta.bh3.com/asset_bundle/beta_release/1.0",
            "https://bh3rd-beta.bh3.com/asset_bundle/beta_release/1.0",
        ],
        Channel::Mainland => &[
            "https://autopatchcn.bh3.com/asset_bundle/hun02/1.0",
            "https://bundle.bh3.com/asset_bundle/hun02/1.0",
        ],
        Channel::Global => &[
            "https://autopatchglb.honkaiimpact3.com/asset_bundle/usa01/1.1",
            "http://bundle-aliyun-usa.honkaiimpact3.com/asset_bundle/usa01/1.1",
        ],
        Channel::Japan => &[
            "https://autopatchjp.honkaiimpact3.com/asset_bundle/jp01/1.1",
            "https://bundle-aliyun-jp.honkaiimpact3.com/asset_bundle/jp01/1.1",
        ],
        Channel::Korea => &[
            "https://autopatchkr.honkaiimpact3.com/asset_bundle/kr01/1.1",
            "https://bundle-aliyun-kr.honkaiimpact3.com/asset_bundle/kr01/1.1",
        ],
        Channel::Overseas => &[
            "https://autopatchos.honkaiimpact3.com/asset_bundle/overseas01/1.1",
            "https://bundle-aliyun-os.honkaiimpact3.com/asset_bundle/overseas01/1.1",
        ],
    };
    urls.iter().map(|u| u.to_string()).collect()
}

pub fn ex_resource_url_list(
    version_key: &str,
    use_local_cache: bool,
    public_url: &str,
) -> Vec<String> {
    let Some((channel, tag)) = channel_of(version_key) else {
        return Vec::new();
    };
    if use_local_cache {
        return local_url_list(tag, version_key, public_url);
    }
    let urls: &[&str] = match channel {
        Channel::MainlandBeta => &[
            "autopatchbeta.bh3.com/tmp/beta",
            "bh3rd-beta.bh3.com/tmp/beta",
        ],
        Channel::Mainland => &[
            "autopatchcn.bh3.com/tmp/Original",
            "bundle.bh3.com/tmp/Original",
        ],
        Channel::Global => &[
            "autopatchglb.honkaiimpact3.com/tmp/com.miHoYo.bh3global",
            "bigfile-aliyun-usa.honkaiimpact3.com/tmp/com.miHoYo.bh3global",
        ],
        Channel::Japan => &[
            "autopatchjp.honkaiimpact3.com/tmp/com.miHoYo.bh3rdJP",
            "bigfile-aliyun-jp.honkaiimpact3.com/tmp/com.miHoYo.bh3rdJP",
        ],
        Channel::Korea => &[
            "autopatchkr.honkaiimpact3.com/com.miHoYo.bh3korea",
            "bigfile-aliyun-kr.honkaiimpact3.com/com.miHoYo.bh3korea",
        ],
        Channel::Overseas => &[
            "autopatchos.honkaiimpact3.com/com.miHoYo.bh3oversea",
            "bigfile-aliyun-os.honkaiimpact3.com/com.miHoYo.bh3oversea",
        ],
    };
    urls.iter().map(|u| u.to_string()).collect()
}

pub fn ex_audio_and_video_url_list(
    version_key: &str,
    use_local_cache: bool,
    public_url: &str,
) -> Vec<String> {
    let Some((channel, tag)) = channel_of(version_key) else {
        return Vec::new();
    };
    if use_local_cache {
        return local_url_list(tag, version_key, public_url);
    }
    let urls: &[&str] = match channel {
        Channel::Overseas => &[
            "autopatchos.honkaiimpact3.com/com.miHoYo.bh3oversea",
            "bigfile-aliyun-os.honkaiimpact3.com/com.miHoYo.bh3oversea",
        ],
        Channel::MainlandBeta => &[
            "autopatchbeta.bh3.com/tmp/CGAudio",
            "bh3rd-beta.bh3.com/tmp/CGAudio",
        ],
        _ => &[
            "bh3rd-beta-qcloud.bh3.com/tmp/CGAudio",
            "bh3rd-beta.bh3.com/tmp/CGAudio",
        ],
    };
    urls.iter().map(|u| u.to_string()).collect()
}
