use rand::{
    distributions::{DistString, Standard},
    rngs::SmallRng,
    SeedableRng,
};
use rstest::rstest;
use uts46::punycode;

const SEED: u64 = 0x5EED_5EED;

#[rstest]
#[case::egyptian("ليهمابتكلموشعربي؟")]
#[case::chinese_simplified("他们为什么不说中文")]
#[case::chinese_traditional("他們爲什麽不說中文")]
#[case::czech("Pročprostěnemluvíčesky")]
#[case::hebrew("למההםפשוטלאמדבריםעברית")]
#[case::hindi("यहलोगहिन्दीक्योंनहींबोलसकतेहैं")]
#[case::japanese("なぜみんな日本語を話してくれないのか")]
#[case::korean("세계의모든사람들이한국어를이해한다면얼마나좋을까")]
#[case::russian("почемужеонинеговорятпорусски")]
#[case::spanish("PorquénopuedensimplementehablarenEspañol")]
#[case::vietnamese("TạisaohọkhôngthểchỉnóitiếngViệt")]
#[case::kinpachi("3年B組金八先生")]
#[case::super_monkeys("安室奈美恵-with-SUPER-MONKEYS")]
#[case::hello_another_way("Hello-Another-Way-それぞれの場所")]
#[case::under_one_roof("ひとつ屋根の下2")]
#[case::takeuchi("MajiでKoiする5秒前")]
#[case::amiyumi("パフィーdeルンバ")]
#[case::at_light_speed("そのスピードで")]
#[case::money("-> $1.00 <-")]
#[case::bucher("bücher")]
fn encode_compare_to_idna(#[case] input: &str) {
    let got = punycode::encode(input).unwrap();
    let expected = idna::punycode::encode_str(input).unwrap();
    assert_eq!(got, expected);
    assert_eq!(punycode::decode(&got).unwrap(), input);
}

#[rstest]
#[case::egyptian("egbpdaj6bu4bxfgehfvwxn")]
#[case::chinese_simplified("ihqwcrb4cv8a8dqg056pqjye")]
#[case::chinese_traditional("ihqwctvzc91f659drss3x8bo0yb")]
#[case::czech("Proprostnemluvesky-uyb24dma41a")]
#[case::hebrew("4dbcagdahymbxekheh6e0a7fei0b")]
#[case::hindi("i1baa7eci9glrd9b2ae1bj0hfcgg6iyaf8o0a1dig0cd")]
#[case::japanese("n8jok5ay5dzabd5bym9f0cm5685rrjetr6pdxa")]
#[case::korean("989aomsvi5e83db1d2a355cv1e0vak1dwrv93d5xbh15a0dt30a5jpsd879ccm6fea98c")]
#[case::russian("b1abfaaepdrnnbgefbaDotcwatmq2g4l")]
#[case::spanish("PorqunopuedensimplementehablarenEspaol-fmd56a")]
#[case::vietnamese("TisaohkhngthchnitingVit-kjcr8268qyxafd2f1b9g")]
#[case::kinpachi("3B-ww4c5e180e575a65lsy2b")]
#[case::super_monkeys("-with-SUPER-MONKEYS-pc58ag80a8qai00g7n9n")]
#[case::hello_another_way("Hello-Another-Way--fc4qua05auwb3674vfr0b")]
#[case::under_one_roof("2-u9tlzr9756bt3uc0v")]
#[case::takeuchi("MajiKoi5-783gue6qz075azm5e")]
#[case::amiyumi("de-jg4avhby1noc0d")]
#[case::at_light_speed("d9juau41awczczp")]
#[case::money("-> $1.00 <--")]
#[case::bucher("bcher-kva")]
fn decode_compare_to_idna(#[case] input: &str) {
    let got = punycode::decode(input).unwrap();
    let expected = idna::punycode::decode_to_string(input).unwrap();
    assert_eq!(got, expected);
}

/// Random strings over all of Unicode survive encoding and decoding.
#[rstest]
#[case::short(16)]
#[case::label(63)]
#[case::long(256)]
fn random_round_trip(#[case] chars: usize) {
    let mut rng = SmallRng::seed_from_u64(SEED);

    for _ in 0..256 {
        let input = Standard.sample_string(&mut rng, chars);
        let encoded = punycode::encode(&input).unwrap();
        assert!(encoded.is_ascii(), "{input:?} -> {encoded:?}");
        assert_eq!(
            Some(&encoded),
            idna::punycode::encode_str(&input).as_ref(),
            "{input:?}"
        );
        assert_eq!(punycode::decode(&encoded).unwrap(), input);
    }
}
