//! Extraction against indicator blocks copied from real reports.

use observables::{defang, Extractor, Form, IpExtractor, Observable, UrlExtractor};

const INDICATOR_BLOCK: &str = "mb.glbaitech[.]com – MoonBounce
        ns.glbaitech[.]com – ScrambleCross
        dev.kinopoisksu[.]com – ScrambleCross
        st.kinopoisksu[.]com – ScrambleCross
        188.166.61[.]146 – ScrambleCross
        172.107.231[.]236 – ScrambleCross
        193.29.57[.]161 – ScrambleCross
        136.244.100[.]127 – ScrambleCross
        217.69.10[.]104 – ScrambleCross
        92.38.178[.]246 – ScrambleCross
        m.necemarket[.]com – Microcin
        172.105.94[.]67 – Microcin
        holdmem.dbhubspi[.]com – Microcin
        5.188.93[.]132 – Go malware
        5.189.222[.]33 – Go malware
        5.183.103[.]122 – Go malware
        5.188.108[.]228 – Go malware
        45.128.132[.]6 – Go malware
        92.223.105[.]246 – Go malware
        5.183.101[.]21 – Go malware
        5.183.101[.]114 – Go malware
        45.128.135[.]15 – Go malware
        5.188.108[.]22 – Go malware
        70.34.201[.]16 – Go malware ";

fn has(observables: &[Observable], form: Form, valu: &str) -> bool {
    observables.iter().any(|o| o.form == form && o.valu == valu)
}

#[test]
fn test_final_dot_not_extracted_in_url() {
    let observables = UrlExtractor::new().extract("http://www.example.org/. ");

    assert_eq!(observables.len(), 1);
    assert!(has(&observables, Form::Url, "http://www.example.org/"));
}

#[test]
fn test_ip_not_extracted_as_url() {
    let observables = UrlExtractor::new().extract(INDICATOR_BLOCK);
    assert!(observables.is_empty());
}

#[test]
fn test_ip_extracted() {
    let observables = IpExtractor::new().extract(INDICATOR_BLOCK);

    assert_eq!(observables.len(), 18);
    for ip in [
        "188.166.61.146",
        "172.107.231.236",
        "193.29.57.161",
        "136.244.100.127",
        "217.69.10.104",
        "92.38.178.246",
        "172.105.94.67",
        "5.188.93.132",
        "5.189.222.33",
        "5.183.103.122",
        "5.188.108.228",
        "45.128.132.6",
        "92.223.105.246",
        "5.183.101.21",
        "5.183.101.114",
        "45.128.135.15",
        "5.188.108.22",
        "70.34.201.16",
    ] {
        assert!(has(&observables, Form::Ipv4, ip), "missing {ip}");
    }
}

const BOOTKIT_PARAGRAPH: &str = "This multistage chain of hooks facilitates the propagation of malicious code from the CORE_DXE
        image to other boot components during system startup, allowing the introduction of a malicious
        driver to the memory address space of the Windows kernel. This driver, which runs during the
        initial phases of the kernel’s execution, is in charge of deploying user-mode malware by injecting it
        into an svchost.exe process, once the operating system is up and running. Finally, the user mode
        malware reaches out to a hardcoded C&C URL (i.e. {URL}) and
        attempts to fetch another stage of the payload to run in memory, which we were not able to
        retrieve. ";

#[test]
fn test_url_extracted() {
    let text = BOOTKIT_PARAGRAPH.replace("{URL}", "hxxp://mb.glbaitech[.]com/mboard.dll");
    let observables = UrlExtractor::new().extract(&text);

    assert_eq!(observables.len(), 1);
    assert!(has(&observables, Form::Url, "http://mb.glbaitech.com/mboard.dll"));
}

#[test]
fn test_url_extracted_with_backslashes() {
    let text = BOOTKIT_PARAGRAPH.replace("{URL}", r"hxxp://mb\.glbaitech\.com/mboard.dll");
    let observables = UrlExtractor::new().extract(&text);

    assert_eq!(observables.len(), 1);
    assert!(has(&observables, Form::Url, "http://mb.glbaitech.com/mboard.dll"));
}

#[test]
fn test_url_extracted_with_squared_brackets() {
    let text = "HolyRS.exe/BTLC.exe C2 URL pattern:

hxxp://193[.]56[.]29[.]123:8888/access.php?order=GetPubkey&cmn=[Victim_HostName]
hxxp://193[.]56[.]29[.]123:8888/access.php?order=golc_key_add&cmn=[Victim_HostName]&type=1
hxxp://193[.]56[.]29[.]123:8888/access.php?order=golc_key_add&cmn=[Victim_HostName]&type=2
hxxp://193[.]56[.]29[.]123:8888/access.php?order=golc_finish&cmn=[Victim_HostName]& ";

    let observables = UrlExtractor::new().extract(text);

    assert_eq!(observables.len(), 4);
    // The closing bracket of a placeholder at end of line goes with the
    // trailing punctuation.
    assert!(has(
        &observables,
        Form::Url,
        "http://193.56.29.123:8888/access.php?order=GetPubkey&cmn=[Victim_HostName"
    ));
    assert!(has(
        &observables,
        Form::Url,
        "http://193.56.29.123:8888/access.php?order=golc_key_add&cmn=[Victim_HostName]&type=1"
    ));
    assert!(has(
        &observables,
        Form::Url,
        "http://193.56.29.123:8888/access.php?order=golc_key_add&cmn=[Victim_HostName]&type=2"
    ));
    assert!(has(
        &observables,
        Form::Url,
        "http://193.56.29.123:8888/access.php?order=golc_finish&cmn=[Victim_HostName]&"
    ));
}

#[test]
fn test_url_extracted_with_parenthesis() {
    let observables = UrlExtractor::new().extract("hxxp://193[.]56[.]29[.]123:8888/access.php)");

    assert_eq!(observables.len(), 1);
    assert!(has(&observables, Form::Url, "http://193.56.29.123:8888/access.php"));
    assert!(!has(&observables, Form::Url, "http://193.56.29.123:8888/access.php)"));
}

#[test]
fn test_url_extracted_with_comma() {
    let observables = UrlExtractor::new().extract("https://www.example.com/hello,world.html");

    assert_eq!(observables.len(), 1);
    assert!(has(&observables, Form::Url, "https://www.example.com/hello,world.html"));
}

#[test]
fn test_defanged_and_clean_text_agree() {
    let defanged = "hxxps://evil[.]example[.]com[:]8443/gate.php from 10.1.2[.]3 and mb\\.glbaitech\\.com";
    let clean = "https://evil.example.com:8443/gate.php from 10.1.2.3 and mb.glbaitech.com";

    assert_eq!(defang(defanged), clean);
    assert_eq!(UrlExtractor::new().extract(defanged), UrlExtractor::new().extract(clean));
    assert_eq!(IpExtractor::new().extract(defanged), IpExtractor::new().extract(clean));
}

#[test]
fn test_consumer_can_stop_early() {
    let clean = defang(INDICATOR_BLOCK);
    let first_two: Vec<_> = IpExtractor::new().scan(&clean).take(2).collect();

    assert_eq!(first_two.len(), 2);
    assert_eq!(first_two[0].valu, "188.166.61.146");
    assert_eq!(first_two[1].valu, "172.107.231.236");
}

mod fanged_round_trip {
    use super::*;
    use proptest::prelude::*;

    // Generators avoid `x` so no label can spell `hxxp`.

    /// Neuter a clean URL the way analysts do before pasting it.
    fn fang(url: &str) -> String {
        url.replacen("http", "hxxp", 1).replace('.', "[.]")
    }

    proptest! {
        #[test]
        fn prop_defanged_url_restores_exactly(
            secure in any::<bool>(),
            labels in proptest::collection::vec("[a-w][a-w0-9-]{0,10}", 2..4),
            path in "(/[A-Wa-w0-9_]{1,8}){0,3}(\\.php|\\.html)?",
        ) {
            let scheme = if secure { "https" } else { "http" };
            let url = format!("{scheme}://{}{path}", labels.join("."));
            let text = format!("Payload hosted at {} for now.", fang(&url));

            let found = UrlExtractor::new().extract(&text);
            prop_assert_eq!(found.len(), 1);
            prop_assert_eq!(&found[0].valu, &url);
        }
    }
}
