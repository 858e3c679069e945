// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - CSP Allowlist Bypass Datasets
 * Known JSONP, Angular and Flash endpoints usable to bypass an allowlist CSP
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

/// Known JSONP endpoints on commonly allowlisted origins. A match means the
/// origin can be abused to execute attacker-controlled JavaScript despite the
/// allowlist.
pub const JSONP_URLS: &[&str] = &[
    "//bebezoo.1688.com/fragment/index.htm",
    "//www.google-analytics.com/gtm/js",
    "//googleads.g.doubleclick.net/pagead/conversion/1036918760/wcm",
    "//www.googleadservices.com/pagead/conversion/1070110417/wcm",
    "//www.google.com/tools/feedback/escalation-options",
    "//pin.aliyun.com/check_audio",
    "//offer.alibaba.com/market/CID100002954/5/fetchKeyword.do",
    "//ccrprod.alipay.com/ccr/arriveTime.json",
    "//group.aliexpress.com/ajaxAcquireGroupbuyProduct.do",
    "//detector.alicdn.com/2.7.3/index.php",
    "//suggest.taobao.com/sug",
    "//translate.google.com/translate_a/l",
    "//count.tbcdn.cn//counter3",
    "//wb.amap.com/channel.php",
    "//translate.googleapis.com/translate_a/l",
    "//afpeng.alimama.com/ex",
    "//accounts.google.com/o/oauth2/revoke",
    "//pagead2.googlesyndication.com/relatedsearch",
    "//yandex.ru/soft/browsers/check",
    "//api.facebook.com/restserver.php",
    "//mts0.googleapis.com/maps/vt",
    "//syndication.twitter.com/widgets/timelines/765840589183213568",
    "//www.youtube.com/profile_style",
    "//googletagmanager.com/gtm/js",
    "//www.googletagmanager.com/gtm/js",
];

/// JSONP endpoints on these hosts only yield script execution when the
/// policy also carries 'unsafe-eval'.
pub const JSONP_NEEDS_EVAL: &[&str] = &[
    "googletagmanager.com",
    "www.googletagmanager.com",
    "www.googleadservices.com",
    "google-analytics.com",
    "ssl.google-analytics.com",
    "www.google-analytics.com",
];

/// Known hosted copies of AngularJS. Allowlisting one of these origins lets
/// an attacker load the library and execute arbitrary expressions through
/// template injection.
pub const ANGULAR_URLS: &[&str] = &[
    "//gstatic.com/fsn/angular_js-bundle1.js",
    "//www.gstatic.com/fsn/angular_js-bundle1.js",
    "//www.googleadservices.com/pageadimg/imgad",
    "//yandex.st/angularjs/1.2.16/angular-cookies.min.js",
    "//yastatic.net/angularjs/1.2.23/angular.min.js",
    "//yuedust.yuedu.126.net/js/components/angular/angular.js",
    "//art.jobs.netease.com/script/angular.js",
    "//csu-c45.kxcdn.com/angular/angular.js",
    "//elysiumwebsite.s3.amazonaws.com/uploads/blog-media/rockstar/angular.min.js",
    "//inno.blob.core.windows.net/new/libs/angularjs/1.2.1/angular.min.js",
    "//gift-talk.kakao.com/public/javascripts/angular.min.js",
    "//ajax.googleapis.com/ajax/libs/angularjs/1.2.0rc1/angular-route.min.js",
    "//master-sumok.ru/vendors/angular/angular-cookies.js",
    "//ayicommon-a.akamaihd.net/static/vendor/angular-1.4.2.min.js",
    "//pangxiehaitao.com/framework/angular-1.3.9/angular-animate.min.js",
    "//cdnjs.cloudflare.com/ajax/libs/angular.js/1.2.16/angular.min.js",
];

/// Known hosted Flash files usable for plugin-based script execution when
/// object-src allows the origin.
pub const FLASH_URLS: &[&str] = &[
    "//vk.com/swf/video.swf",
    "//ajax.googleapis.com/ajax/libs/yui/2.8.0r4/build/charts/assets/charts.swf",
];

/// Bypass datasets consumed by the allowlist checks. Passed explicitly so
/// evaluations stay deterministic; tests and callers with fresher data can
/// substitute their own lists.
#[derive(Debug, Clone)]
pub struct BypassData {
    pub jsonp_urls: Vec<String>,
    pub jsonp_needs_eval: Vec<String>,
    pub angular_urls: Vec<String>,
    pub flash_urls: Vec<String>,
}

impl Default for BypassData {
    fn default() -> Self {
        Self {
            jsonp_urls: JSONP_URLS.iter().map(|s| s.to_string()).collect(),
            jsonp_needs_eval: JSONP_NEEDS_EVAL.iter().map(|s| s.to_string()).collect(),
            angular_urls: ANGULAR_URLS.iter().map(|s| s.to_string()).collect(),
            flash_urls: FLASH_URLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_data_populated() {
        let data = BypassData::default();
        assert!(!data.jsonp_urls.is_empty());
        assert!(!data.jsonp_needs_eval.is_empty());
        assert!(!data.angular_urls.is_empty());
        assert!(!data.flash_urls.is_empty());
    }

    #[test]
    fn test_urls_are_protocol_relative() {
        for url in JSONP_URLS.iter().chain(ANGULAR_URLS).chain(FLASH_URLS) {
            assert!(url.starts_with("//"), "{} is not protocol-relative", url);
        }
        // The eval gate compares hostnames, not URLs
        for host in JSONP_NEEDS_EVAL {
            assert!(!host.contains('/'), "{} is not a bare hostname", host);
        }
    }
}
